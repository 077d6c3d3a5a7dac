//! Logo processor
//!
//! `LogoProcessor` runs the full per-image pipeline: optional asset
//! adjustments, background keying, tone normalization, dark-variant
//! derivation and canvas fitting. It holds no per-image state, so one
//! processor can be shared by concurrent workers.

use crate::{
    adjust,
    canvas::{fit_to_canvas, fit_to_canvas_with_geometry},
    config::PipelineConfig,
    dark_variant::derive_dark_variant,
    error::{LogoError, Result},
    keyer::{
        key_out_background, key_out_corner_majority, key_out_near_white, keying_decision,
        majority_corner_color,
    },
    manifest::{AssetOverrides, KeyingMode},
    normalizer::{mean_foreground_luma, normalize_with_outcome},
    services::{
        format::{default_target_name, InputFormat, OutputNames},
        ImageIOService, NoOpProgressReporter, ProcessingStage, ProgressReporter, ProgressTracker,
    },
    types::{LogoVariants, ProcessingStats, ProcessingTimings, WrittenOutputs},
};
use image::{DynamicImage, GenericImageView, RgbaImage};
use instant::Instant;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, instrument, span, Level};

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Runs the logo pipeline with a fixed configuration
pub struct LogoProcessor {
    config: PipelineConfig,
    reporter: Arc<dyn ProgressReporter>,
}

impl std::fmt::Debug for LogoProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogoProcessor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LogoProcessor {
    /// Create a processor that reports no progress
    ///
    /// # Errors
    ///
    /// Returns `LogoError::InvalidConfig` when the configuration does not validate.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_reporter(config, Arc::new(NoOpProgressReporter))
    }

    /// Create a processor that forwards per-stage progress to `reporter`
    ///
    /// # Errors
    ///
    /// Returns `LogoError::InvalidConfig` when the configuration does not validate.
    pub fn with_reporter(
        config: PipelineConfig,
        reporter: Arc<dyn ProgressReporter>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, reporter })
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Produce light and dark canvas-sized variants of a decoded image
    ///
    /// # Errors
    ///
    /// Returns `LogoError` for:
    /// - Images with a zero dimension
    /// - Invalid per-asset adjustments (crop fraction outside `(0, 1]`)
    #[instrument(
        skip(self, image, overrides),
        fields(dimensions = %format!("{}x{}", image.width(), image.height()))
    )]
    pub fn process_image(
        &self,
        image: &DynamicImage,
        overrides: Option<&AssetOverrides>,
    ) -> Result<LogoVariants> {
        let mut tracker = ProgressTracker::new(Arc::clone(&self.reporter));
        let total_start = Instant::now();
        let mut timings = ProcessingTimings::new();

        let result = self.run_pipeline(image, overrides, &mut tracker, &mut timings);
        match result {
            Ok(mut variants) => {
                timings.total_ms = elapsed_ms(total_start);
                variants.stats.timings = timings;
                Ok(variants)
            },
            Err(e) => {
                tracker.report_error(&e.to_string());
                Err(e)
            },
        }
    }

    /// Process one input file into `output_dir`
    ///
    /// Raster inputs produce `<name>.png` and `<name>-dark.png`; SVG inputs are
    /// copied to `<name>.svg`. `target_name` defaults to the input stem with any
    /// `-dark` suffix removed. Existing outputs are overwritten.
    ///
    /// # Errors
    ///
    /// Returns `LogoError` for:
    /// - Missing input (`MissingInput`)
    /// - Undecodable input (`Decode`)
    /// - Unrecognized input format (`UnsupportedFormat`)
    /// - Output that cannot be written (`Encode`, `Io`)
    pub fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output_dir: Q,
        target_name: Option<&str>,
    ) -> Result<WrittenOutputs> {
        let overrides = AssetOverrides {
            target: target_name.map(str::to_string),
            ..AssetOverrides::default()
        };
        self.process_file_with_overrides(input, output_dir, Some(&overrides))
    }

    /// Process one input file with manifest overrides
    ///
    /// # Errors
    ///
    /// See [`LogoProcessor::process_file`].
    #[instrument(
        skip(self, input, output_dir, overrides),
        fields(input = %input.as_ref().display())
    )]
    pub fn process_file_with_overrides<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input: P,
        output_dir: Q,
        overrides: Option<&AssetOverrides>,
    ) -> Result<WrittenOutputs> {
        let input = input.as_ref();
        let mut tracker = ProgressTracker::new(Arc::clone(&self.reporter));

        let result = self.process_file_inner(input, output_dir.as_ref(), overrides, &mut tracker);
        if let Err(ref e) = result {
            tracker.report_error(&e.to_string());
        }
        result
    }

    fn process_file_inner(
        &self,
        input: &Path,
        output_dir: &Path,
        overrides: Option<&AssetOverrides>,
        tracker: &mut ProgressTracker,
    ) -> Result<WrittenOutputs> {
        let total_start = Instant::now();
        let target = overrides
            .and_then(|o| o.target.clone())
            .unwrap_or_else(|| default_target_name(input));
        let names = OutputNames::new(output_dir, &target);

        if !input.is_file() {
            return Err(LogoError::missing_input(input));
        }

        tracker.report_stage_with_description(
            ProcessingStage::Loading,
            format!("Loading {}", input.display()),
        );
        let format = match InputFormat::from_extension(input) {
            Some(format) => format,
            None => {
                let data = std::fs::read(input)
                    .map_err(|e| LogoError::read_error("read input", input, &e))?;
                InputFormat::detect(&data).ok_or_else(|| {
                    LogoError::unsupported_format(format!(
                        "'{}' is not PNG, JPEG, WebP or SVG",
                        input.display()
                    ))
                })?
            },
        };

        if !format.is_raster() {
            ImageIOService::copy_file(input, &names.svg)?;
            info!(output = %names.svg.display(), "copied vector logo");
            tracker.report_stage(ProcessingStage::Completed);
            return Ok(WrittenOutputs::Vector { copy: names.svg });
        }

        let decode_start = Instant::now();
        let image = ImageIOService::load_image(input)?;
        let decode_ms = elapsed_ms(decode_start);

        let mut timings = ProcessingTimings::new();
        let mut variants = self.run_pipeline(&image, overrides, tracker, &mut timings)?;
        timings.decode_ms = decode_ms;

        tracker.report_stage(ProcessingStage::Encoding);
        let encode_start = Instant::now();
        {
            let _span = span!(Level::DEBUG, "encoding", light = %names.light.display()).entered();
            ImageIOService::save_png(&variants.light, &names.light, self.config.compression)?;
            ImageIOService::save_png(&variants.dark, &names.dark, self.config.compression)?;
        }
        timings.encode_ms = Some(elapsed_ms(encode_start));
        timings.total_ms = elapsed_ms(total_start);
        variants.stats.timings = timings.clone();

        tracker.report_stage(ProcessingStage::Completed);
        tracker.report_completion(timings);

        info!(
            input = %input.display(),
            light = %names.light.display(),
            dark = %names.dark.display(),
            inverted = variants.stats.inverted,
            keyed = variants.stats.keyed,
            "processed logo"
        );

        Ok(WrittenOutputs::Variants {
            light: names.light,
            dark: names.dark,
        })
    }

    fn run_pipeline(
        &self,
        image: &DynamicImage,
        overrides: Option<&AssetOverrides>,
        tracker: &mut ProgressTracker,
        timings: &mut ProcessingTimings,
    ) -> Result<LogoVariants> {
        let defaults = AssetOverrides::default();
        let overrides = overrides.unwrap_or(&defaults);
        let mut stats = ProcessingStats {
            source_size: image.dimensions(),
            ..ProcessingStats::default()
        };

        let mut rgba = image.to_rgba8();

        if let Some(fraction) = overrides.crop_top_fraction {
            tracker.report_stage(ProcessingStage::PreAdjust);
            let start = Instant::now();
            rgba = adjust::crop_top(&rgba, fraction)?;
            timings.adjust_ms += elapsed_ms(start);
        }

        tracker.report_stage(ProcessingStage::Keying);
        let keyed = {
            let _span = span!(Level::DEBUG, "keying", mode = ?overrides.keying).entered();
            let start = Instant::now();
            let keyed = self.key(&rgba, overrides, &mut stats);
            timings.keying_ms = elapsed_ms(start);
            keyed
        };

        let keyed = if overrides.trim_to_content || overrides.recolor_near_white.is_some() {
            tracker.report_stage(ProcessingStage::PreAdjust);
            let start = Instant::now();
            let mut adjusted = keyed;
            if overrides.trim_to_content {
                adjusted = adjust::trim_to_content(&adjusted);
            }
            if let Some(rule) = overrides.recolor_near_white {
                adjusted = adjust::recolor_near_white(&adjusted, rule.threshold, rule.color);
            }
            timings.adjust_ms += elapsed_ms(start);
            adjusted
        } else {
            keyed
        };

        tracker.report_stage(ProcessingStage::Normalizing);
        let start = Instant::now();
        let normalized = if overrides.skip_normalize {
            let threshold = self.config.normalize.foreground_alpha_threshold;
            stats.mean_luma = mean_foreground_luma(&keyed, threshold);
            stats.foreground_pixels = keyed.pixels().filter(|p| p[3] > threshold).count();
            debug!("normalization skipped for this asset");
            keyed
        } else {
            let (normalized, outcome) = normalize_with_outcome(&keyed, &self.config.normalize);
            stats.mean_luma = outcome.mean_luma;
            stats.foreground_pixels = outcome.foreground_pixels;
            stats.inverted = outcome.inverted;
            normalized
        };
        timings.normalize_ms = elapsed_ms(start);

        let compose_start = Instant::now();
        tracker.report_stage(ProcessingStage::DarkVariant);
        let dark = derive_dark_variant(&normalized);

        tracker.report_stage(ProcessingStage::Fitting);
        let (light, geometry) = {
            let _span = span!(Level::DEBUG, "fitting", canvas = ?self.config.canvas).entered();
            fit_to_canvas_with_geometry(&normalized, &self.config.canvas)?
        };
        let dark = fit_to_canvas(&dark, &self.config.canvas)?;
        timings.compose_ms = elapsed_ms(compose_start);

        stats.scaled_size = (geometry.width, geometry.height);

        Ok(LogoVariants { light, dark, stats })
    }

    fn key(
        &self,
        image: &RgbaImage,
        overrides: &AssetOverrides,
        stats: &mut ProcessingStats,
    ) -> RgbaImage {
        match overrides.keying {
            KeyingMode::Corner => {
                let mut keying = self.config.keying;
                if overrides.background.is_some() {
                    keying.background_override = overrides.background;
                }
                if let Some(decision) = keying_decision(image, &keying) {
                    stats.reference_color = Some(decision.reference);
                    stats.tolerance = Some(decision.tolerance);
                    stats.keyed = true;
                }
                key_out_background(image, &keying)
            },
            KeyingMode::NearWhite { threshold } => {
                stats.keyed = true;
                key_out_near_white(image, threshold)
            },
            KeyingMode::CornerMajority { threshold } => {
                stats.reference_color = majority_corner_color(image);
                stats.keyed = stats.reference_color.is_some();
                key_out_corner_majority(image, threshold)
            },
            KeyingMode::Skip => {
                debug!("keying skipped for this asset");
                image.clone()
            },
        }
    }
}
