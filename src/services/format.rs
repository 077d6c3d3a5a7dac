//! Input format detection and output naming
//!
//! Keeps file-name conventions out of the pixel pipeline: which inputs are
//! accepted, which files are previously generated outputs, and what the
//! light/dark outputs of a logo are called.

use std::path::{Path, PathBuf};

/// Suffix that marks a dark-mode variant
pub const DARK_SUFFIX: &str = "-dark";

/// Input formats accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Png,
    Jpeg,
    WebP,
    /// Vector logo, copied through without rasterizing
    Svg,
}

impl InputFormat {
    /// Extensions recognized when collecting inputs
    pub const EXTENSIONS: [&'static str; 5] = ["png", "jpg", "jpeg", "webp", "svg"];

    /// Determine format from a file extension (case-insensitive)
    #[must_use]
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Sniff the format from leading file bytes
    #[must_use]
    pub fn detect(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data
            .get(0..8)
            .is_some_and(|slice| slice == [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A])
        {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.get(0..3).is_some_and(|slice| slice == [0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.get(0..4).is_some_and(|slice| slice == b"RIFF")
            && data.get(8..12).is_some_and(|slice| slice == b"WEBP")
        {
            return Some(Self::WebP);
        }

        let head = String::from_utf8_lossy(data.get(..data.len().min(512)).unwrap_or(data));
        let head = head.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
            return Some(Self::Svg);
        }

        None
    }

    #[must_use]
    pub fn is_raster(self) -> bool {
        !matches!(self, Self::Svg)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::WebP => "WebP",
            Self::Svg => "SVG",
        }
    }
}

/// Whether `path` has an accepted extension
#[must_use]
pub fn is_supported_input(path: &Path) -> bool {
    InputFormat::from_extension(path).is_some()
}

/// Whether `path` is a previously generated dark variant (`*-dark.png`)
#[must_use]
pub fn is_dark_output(path: &Path) -> bool {
    let is_png = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    let stem_is_dark = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(DARK_SUFFIX));
    is_png && stem_is_dark
}

/// Default output base name: the file stem with any `-dark` suffix removed
#[must_use]
pub fn default_target_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.strip_suffix(DARK_SUFFIX).unwrap_or(&stem).to_string()
}

/// Output paths for one logo name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    pub light: PathBuf,
    pub dark: PathBuf,
    pub svg: PathBuf,
}

impl OutputNames {
    #[must_use]
    pub fn new(output_dir: &Path, target: &str) -> Self {
        let target = target.strip_suffix(DARK_SUFFIX).unwrap_or(target);
        Self {
            light: output_dir.join(format!("{}.png", target)),
            dark: output_dir.join(format!("{}{}.png", target, DARK_SUFFIX)),
            svg: output_dir.join(format!("{}.svg", target)),
        }
    }
}
