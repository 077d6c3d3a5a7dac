//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{Cli, CliCompression, CliPreset};
use crate::config::{CanvasPreset, HexColor, PipelineConfig, PngCompression};
use anyhow::{Context, Result};

/// Convert CLI arguments to a `PipelineConfig`
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build `PipelineConfig` from CLI arguments
    pub(crate) fn from_cli(cli: &Cli) -> Result<PipelineConfig> {
        let preset = match cli.preset {
            CliPreset::Strip => CanvasPreset::Strip,
            CliPreset::Card => CanvasPreset::Card,
        };
        let compression = match cli.compression {
            CliCompression::Fast => PngCompression::Fast,
            CliCompression::Default => PngCompression::Default,
            CliCompression::Best => PngCompression::Best,
        };

        let preset_canvas = preset.canvas();
        let background = cli
            .background
            .as_deref()
            .map(str::parse::<HexColor>)
            .transpose()
            .context("Invalid --background color")?;

        let config = PipelineConfig::builder()
            .canvas(
                cli.width.unwrap_or(preset_canvas.width),
                cli.height.unwrap_or(preset_canvas.height),
                cli.padding.unwrap_or(preset_canvas.padding),
            )
            .background_override(background)
            .compression(compression)
            .build()
            .context("Invalid configuration")?;

        Ok(config)
    }

    /// Validate CLI arguments for consistency
    pub(crate) fn validate_cli(cli: &Cli) -> Result<()> {
        if cli.jobs == 0 {
            anyhow::bail!("--jobs must be at least 1");
        }

        if let Some(pattern) = &cli.pattern {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid --pattern '{}'", pattern))?;
        }

        if let Some(report) = &cli.report {
            if report.is_dir() {
                anyhow::bail!("--report must be a file path, got directory {}", report.display());
            }
        }

        Ok(())
    }
}
