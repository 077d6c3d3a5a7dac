//! Configuration types for logo normalization

use crate::error::{LogoError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An opaque RGB color, written as `#rrggbb` in configuration files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const WHITE: Self = Self([255, 255, 255]);

    #[must_use]
    pub fn rgb(self) -> [u8; 3] {
        self.0
    }
}

impl FromStr for HexColor {
    type Err = LogoError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(LogoError::invalid_config(format!(
                "color '{}' must have the form #rrggbb",
                s
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| {
                    LogoError::invalid_config(format!("color '{}' contains non-hex digits", s))
                })
        };

        Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }
}

impl TryFrom<String> for HexColor {
    type Error = LogoError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Target canvas that every variant is centered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
    /// Minimum margin kept on the tighter-fitting axis
    pub padding: u32,
}

impl CanvasConfig {
    /// Interior size available to content once padding is removed on both sides
    #[must_use]
    pub fn content_area(&self) -> (u32, u32) {
        (
            self.width.saturating_sub(self.padding * 2),
            self.height.saturating_sub(self.padding * 2),
        )
    }

    /// Percentage of the canvas that content may occupy
    #[must_use]
    pub fn content_usage_pct(&self) -> f64 {
        let (w, h) = self.content_area();
        let total = f64::from(self.width) * f64::from(self.height);
        if total == 0.0 {
            0.0
        } else {
            f64::from(w) * f64::from(h) / total * 100.0
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(LogoError::invalid_config(format!(
                "canvas must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }

        let limit = self.width.min(self.height);
        if u64::from(self.padding) * 2 >= u64::from(limit) {
            return Err(LogoError::config_value_error(
                "padding",
                self.padding,
                &format!("0-{}", (limit - 1) / 2),
                Some(3),
            ));
        }

        Ok(())
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        CanvasPreset::Strip.canvas()
    }
}

/// Named canvas sizes used by the web page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasPreset {
    /// 200x80 logo strip with 3px padding
    Strip,
    /// 400x200 partner card with 3px padding
    Card,
}

impl CanvasPreset {
    #[must_use]
    pub fn canvas(self) -> CanvasConfig {
        match self {
            Self::Strip => CanvasConfig {
                width: 200,
                height: 80,
                padding: 3,
            },
            Self::Card => CanvasConfig {
                width: 400,
                height: 200,
                padding: 3,
            },
        }
    }
}

impl fmt::Display for CanvasPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strip => write!(f, "strip"),
            Self::Card => write!(f, "card"),
        }
    }
}

/// Corner-sampled background keying parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyingConfig {
    /// Per-channel tolerance around the reference color
    pub base_tolerance: u8,
    /// Every reference channel must exceed this for the background to count as near-white
    pub near_white_threshold: u8,
    /// Tolerance used for near-white backgrounds
    pub near_white_tolerance: u8,
    /// Reference color to use instead of the top-left pixel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_override: Option<HexColor>,
}

impl KeyingConfig {
    /// Tolerance to apply for a given reference color
    #[must_use]
    pub fn tolerance_for(&self, reference: [u8; 3]) -> u8 {
        if reference.iter().all(|&c| c > self.near_white_threshold) {
            self.near_white_tolerance
        } else {
            self.base_tolerance
        }
    }
}

impl Default for KeyingConfig {
    fn default() -> Self {
        Self {
            base_tolerance: 40,
            near_white_threshold: 215,
            near_white_tolerance: 80,
            background_override: None,
        }
    }
}

/// Light/dark polarity normalization parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizeConfig {
    /// Pixels with alpha strictly above this count as foreground
    pub foreground_alpha_threshold: u8,
    /// Mean foreground luma above which content is treated as light
    pub brightness_threshold: f64,
    /// Contrast factor applied to inverted foreground pixels
    pub contrast_factor: f64,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            foreground_alpha_threshold: 50,
            brightness_threshold: 128.0,
            contrast_factor: 1.1,
        }
    }
}

/// PNG compression effort; output is always lossless
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PngCompression {
    /// Fastest encode, larger files
    #[default]
    Fast,
    /// Balanced
    Default,
    /// Smallest files, slowest encode
    Best,
}

impl PngCompression {
    #[must_use]
    pub fn to_image_compression(self) -> image::codecs::png::CompressionType {
        use image::codecs::png::CompressionType;
        match self {
            Self::Fast => CompressionType::Fast,
            Self::Default => CompressionType::Default,
            Self::Best => CompressionType::Best,
        }
    }
}

impl fmt::Display for PngCompression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Default => write!(f, "default"),
            Self::Best => write!(f, "best"),
        }
    }
}

/// Full configuration for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub canvas: CanvasConfig,
    pub keying: KeyingConfig,
    pub normalize: NormalizeConfig,
    pub compression: PngCompression,
}

impl PipelineConfig {
    /// Create a new configuration builder
    ///
    /// # Examples
    ///
    /// ```rust
    /// use logo_normalize::{CanvasPreset, PipelineConfig, PngCompression};
    ///
    /// let config = PipelineConfig::builder()
    ///     .preset(CanvasPreset::Card)
    ///     .compression(PngCompression::Best)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(config.canvas.width, 400);
    /// ```
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate all configuration parameters
    ///
    /// # Errors
    /// - Canvas with a zero dimension
    /// - Padding that leaves no interior (`2 * padding >= min(width, height)`)
    /// - Contrast factor that is negative or not finite
    /// - Brightness threshold outside 0-255
    pub fn validate(&self) -> Result<()> {
        self.canvas.validate()?;

        let factor = self.normalize.contrast_factor;
        if !factor.is_finite() || factor < 0.0 {
            return Err(LogoError::config_value_error(
                "contrast factor",
                factor,
                "0.0 or greater",
                Some(1.1),
            ));
        }

        let threshold = self.normalize.brightness_threshold;
        if !(0.0..=255.0).contains(&threshold) {
            return Err(LogoError::config_value_error(
                "brightness threshold",
                threshold,
                "0-255",
                Some(128.0),
            ));
        }

        Ok(())
    }
}

/// Builder for `PipelineConfig`
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn preset(mut self, preset: CanvasPreset) -> Self {
        self.config.canvas = preset.canvas();
        self
    }

    #[must_use]
    pub fn canvas(mut self, width: u32, height: u32, padding: u32) -> Self {
        self.config.canvas = CanvasConfig {
            width,
            height,
            padding,
        };
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: u32) -> Self {
        self.config.canvas.padding = padding;
        self
    }

    #[must_use]
    pub fn base_tolerance(mut self, tolerance: u8) -> Self {
        self.config.keying.base_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn near_white(mut self, threshold: u8, tolerance: u8) -> Self {
        self.config.keying.near_white_threshold = threshold;
        self.config.keying.near_white_tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn background_override(mut self, color: Option<HexColor>) -> Self {
        self.config.keying.background_override = color;
        self
    }

    #[must_use]
    pub fn foreground_alpha_threshold(mut self, threshold: u8) -> Self {
        self.config.normalize.foreground_alpha_threshold = threshold;
        self
    }

    #[must_use]
    pub fn brightness_threshold(mut self, threshold: f64) -> Self {
        self.config.normalize.brightness_threshold = threshold;
        self
    }

    #[must_use]
    pub fn contrast_factor(mut self, factor: f64) -> Self {
        self.config.normalize.contrast_factor = factor;
        self
    }

    #[must_use]
    pub fn compression(mut self, compression: PngCompression) -> Self {
        self.config.compression = compression;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `LogoError::InvalidConfig` when `PipelineConfig::validate` fails.
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
