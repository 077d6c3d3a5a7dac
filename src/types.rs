//! Result types produced by the logo pipeline

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Light and dark variants of one logo, both canvas-sized
#[derive(Debug, Clone)]
pub struct LogoVariants {
    /// Dark-toned content on a transparent canvas
    pub light: RgbaImage,
    /// White silhouette on a transparent canvas
    pub dark: RgbaImage,
    /// What the pipeline decided along the way
    pub stats: ProcessingStats,
}

impl LogoVariants {
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.light.dimensions()
    }

    #[must_use]
    pub fn stats(&self) -> &ProcessingStats {
        &self.stats
    }
}

/// Per-image decisions and measurements
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Source dimensions after decoding
    pub source_size: (u32, u32),
    /// Background reference color, `None` when keying was skipped
    pub reference_color: Option<[u8; 3]>,
    /// Keying tolerance used with `reference_color`
    pub tolerance: Option<u8>,
    /// Whether any background was removed
    pub keyed: bool,
    /// Whether content was inverted to dark tones
    pub inverted: bool,
    /// Pixels counted as foreground by the normalizer
    pub foreground_pixels: usize,
    /// Mean foreground luma before normalization
    pub mean_luma: Option<f64>,
    /// Size of the content once scaled onto the canvas
    pub scaled_size: (u32, u32),
    pub timings: ProcessingTimings,
}

/// Stage timings in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingTimings {
    /// Reading and decoding the source file
    pub decode_ms: u64,
    /// Crop, trim and recolor adjustments
    pub adjust_ms: u64,
    pub keying_ms: u64,
    pub normalize_ms: u64,
    /// Dark variant derivation plus both canvas fits
    pub compose_ms: u64,
    /// PNG encoding and writing, when saving to disk
    pub encode_ms: Option<u64>,
    /// Total end-to-end time
    pub total_ms: u64,
}

impl ProcessingTimings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get breakdown percentages
    #[must_use]
    pub fn breakdown_percentages(&self) -> TimingBreakdown {
        if self.total_ms == 0 {
            return TimingBreakdown::default();
        }

        let total = self.total_ms as f64;
        let pct = |ms: u64| ms as f64 / total * 100.0;
        let measured = self.decode_ms
            + self.adjust_ms
            + self.keying_ms
            + self.normalize_ms
            + self.compose_ms
            + self.encode_ms.unwrap_or(0);

        TimingBreakdown {
            decode_pct: pct(self.decode_ms),
            adjust_pct: pct(self.adjust_ms),
            keying_pct: pct(self.keying_ms),
            normalize_pct: pct(self.normalize_ms),
            compose_pct: pct(self.compose_ms),
            encode_pct: pct(self.encode_ms.unwrap_or(0)),
            other_pct: pct(self.total_ms.saturating_sub(measured)),
        }
    }
}

/// Percentage breakdown of timing phases
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimingBreakdown {
    pub decode_pct: f64,
    pub adjust_pct: f64,
    pub keying_pct: f64,
    pub normalize_pct: f64,
    pub compose_pct: f64,
    pub encode_pct: f64,
    pub other_pct: f64,
}

/// Files written for one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WrittenOutputs {
    /// Raster input: light and dark PNG variants
    Variants { light: PathBuf, dark: PathBuf },
    /// SVG input copied through unchanged
    Vector { copy: PathBuf },
}

impl WrittenOutputs {
    /// All paths written, in write order
    #[must_use]
    pub fn paths(&self) -> Vec<&PathBuf> {
        match self {
            Self::Variants { light, dark } => vec![light, dark],
            Self::Vector { copy } => vec![copy],
        }
    }
}
