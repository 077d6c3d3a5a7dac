#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]

//! # Logo Normalization Library
//!
//! Turns heterogeneous logo artwork into a uniform pair of transparent PNGs:
//! a *light* variant with dark-toned content for white pages and a *dark*
//! variant that is a solid white silhouette for dark pages. Both variants are
//! scaled and centered on the same fixed-size canvas.
//!
//! ## Pipeline
//!
//! 1. **Keying**: the top-left pixel is taken as the background color and
//!    every pixel within a per-channel tolerance becomes transparent. Near-white
//!    backgrounds get a wider tolerance to absorb JPEG noise.
//! 2. **Normalization**: when the visible content is predominantly light it is
//!    inverted and given a mild contrast boost.
//! 3. **Dark variant**: the alpha silhouette filled with white.
//! 4. **Canvas fitting**: uniform Lanczos3 scaling into the padded canvas
//!    interior, centered.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use logo_normalize::{CanvasPreset, LogoProcessor, PipelineConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = PipelineConfig::builder()
//!     .preset(CanvasPreset::Card)
//!     .build()?;
//! let processor = LogoProcessor::new(config)?;
//!
//! // Writes out/acme.png and out/acme-dark.png
//! processor.process_file("logos/acme.jpg", "out", None)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): command-line interface, progress bar and tracing setup
//! - `webp-support` (default): WebP input support
//! - `tracing-json`: JSON log output for the CLI
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! logo-normalize = { version = "0.1", default-features = false }
//! ```

pub mod adjust;
pub mod batch;
pub mod canvas;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod dark_variant;
pub mod error;
pub mod keyer;
pub mod manifest;
pub mod normalizer;
pub mod processor;
pub mod services;
#[cfg(feature = "cli")]
pub mod tracing_config;
pub mod types;

// Public API exports
pub use batch::{
    plan_batch, process_item, run_sequential, BatchItem, BatchReport, BatchSummary, FailureKind,
    FileOutcome, FileReport,
};
pub use canvas::{fit_dimensions, fit_to_canvas, FitGeometry};
pub use config::{
    CanvasConfig, CanvasPreset, HexColor, KeyingConfig, NormalizeConfig, PipelineConfig,
    PipelineConfigBuilder, PngCompression,
};
pub use dark_variant::derive_dark_variant;
pub use error::{LogoError, Result};
pub use keyer::{
    key_out_background, key_out_corner_majority, key_out_near_white, majority_corner_color,
};
pub use manifest::{AssetOverrides, KeyingMode, Manifest, Recolor};
pub use normalizer::{mean_foreground_luma, normalize_to_dark_content};
pub use processor::LogoProcessor;
pub use services::{
    ConsoleProgressReporter, ImageIOService, InputFormat, NoOpProgressReporter, ProcessingStage,
    ProgressReporter, ProgressTracker, ProgressUpdate,
};
pub use types::{LogoVariants, ProcessingStats, ProcessingTimings, WrittenOutputs};

#[cfg(feature = "cli")]
pub use tracing_config::{events, init_cli_tracing, spans, TracingConfig, TracingFormat};

/// Produce light and dark variants of a decoded image
///
/// # Examples
///
/// ```rust
/// use image::{DynamicImage, Rgba, RgbaImage};
/// use logo_normalize::{normalize_logo, PipelineConfig};
///
/// let logo = DynamicImage::ImageRgba8(RgbaImage::from_fn(60, 30, |x, _| {
///     if x < 30 { Rgba([255, 255, 255, 255]) } else { Rgba([20, 40, 160, 255]) }
/// }));
/// let variants = normalize_logo(&logo, &PipelineConfig::default())?;
/// assert_eq!(variants.light.dimensions(), (200, 80));
/// # Ok::<(), logo_normalize::LogoError>(())
/// ```
pub fn normalize_logo(
    image: &image::DynamicImage,
    config: &PipelineConfig,
) -> Result<LogoVariants> {
    LogoProcessor::new(*config)?.process_image(image, None)
}

/// Produce light and dark variants from encoded image bytes (PNG, JPEG, WebP)
pub fn normalize_logo_bytes(bytes: &[u8], config: &PipelineConfig) -> Result<LogoVariants> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| LogoError::Decode(format!("Failed to decode image from bytes: {}", e)))?;
    normalize_logo(&image, config)
}
