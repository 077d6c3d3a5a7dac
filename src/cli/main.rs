//! Logo normalization CLI tool
//!
//! Command-line interface that runs the logo pipeline over files and
//! directories and writes light/dark PNG variants into an output directory.

use super::config::CliConfigBuilder;
use crate::{
    batch::{plan_batch, process_item, BatchItem, BatchReport, FileOutcome},
    manifest::Manifest,
    processor::LogoProcessor,
    services::{
        format::{is_dark_output, is_supported_input},
        ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter,
    },
    tracing_config::{events, init_cli_tracing, spans},
};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn, Instrument};

/// Key out logo backgrounds and write light/dark canvas variants
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "logo-normalize")]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input logo files or directories
    #[arg(value_name = "INPUT", required_unless_present_any = &["show_config", "manifest"])]
    pub input: Vec<String>,

    /// Output directory for `<name>.png` and `<name>-dark.png`
    #[arg(short, long, value_name = "DIR", required_unless_present = "show_config")]
    pub output: Option<PathBuf>,

    /// Canvas preset
    #[arg(long, value_enum, default_value_t = CliPreset::Strip)]
    pub preset: CliPreset,

    /// Canvas width in pixels (overrides the preset)
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels (overrides the preset)
    #[arg(long)]
    pub height: Option<u32>,

    /// Canvas padding in pixels (overrides the preset)
    #[arg(long)]
    pub padding: Option<u32>,

    /// Background color to key out instead of the top-left pixel (#rrggbb)
    #[arg(long, value_name = "HEX")]
    pub background: Option<String>,

    /// JSON manifest mapping source files to output names and per-asset overrides
    #[arg(long, value_name = "FILE")]
    pub manifest: Option<PathBuf>,

    /// Process directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// File name pattern for directory inputs (e.g., "*.png")
    #[arg(long)]
    pub pattern: Option<String>,

    /// PNG compression effort
    #[arg(long, value_enum, default_value_t = CliCompression::Fast)]
    pub compression: CliCompression,

    /// Number of logos processed concurrently
    #[arg(short, long, default_value_t = 1)]
    pub jobs: usize,

    /// Write a JSON batch report to this path
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Log per-stage progress for every logo
    #[arg(long)]
    pub progress: bool,

    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit logs as JSON (requires the `tracing-json` feature)
    #[arg(long)]
    pub json_logs: bool,

    /// Print the resolved pipeline configuration as JSON and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliPreset {
    /// 200x80 logo strip
    Strip,
    /// 400x200 partner card
    Card,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliCompression {
    Fast,
    Default,
    Best,
}

pub async fn main() -> Result<()> {
    let cli = Cli::parse();

    let session_id =
        init_cli_tracing(cli.verbose, cli.json_logs).context("Failed to initialize tracing")?;

    CliConfigBuilder::validate_cli(&cli).context("Invalid CLI arguments")?;
    let config = CliConfigBuilder::from_cli(&cli).context("Failed to build configuration")?;

    if cli.show_config {
        println!(
            "{}",
            serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?
        );
        return Ok(());
    }

    let output_dir = cli
        .output
        .clone()
        .context("An output directory is required (--output)")?;
    prepare_output_dir(&output_dir)?;

    let manifest = match &cli.manifest {
        Some(path) => Some(
            Manifest::load(path)
                .with_context(|| format!("Failed to load manifest {}", path.display()))?,
        ),
        None => None,
    };

    let collected = collect_inputs(&cli.input, cli.recursive, cli.pattern.as_deref())?;
    let source_dir = source_dir(&cli);
    let items = plan_batch(collected.files, manifest.as_ref(), &source_dir);

    info!(
        canvas = %format!("{}x{}", config.canvas.width, config.canvas.height),
        padding = config.canvas.padding,
        compression = %config.compression,
        "Starting logo normalization"
    );
    info!("Found {} logo file(s) to process", items.len());

    let mut report = BatchReport::new(config, Some(session_id.clone()));
    for skipped in collected.skipped {
        debug!(path = %skipped.display(), "skipping generated dark variant");
        report.record_skipped(skipped, "generated dark variant");
    }

    if items.is_empty() {
        warn!("No supported logo files found in the provided inputs");
    }

    let reporter: Arc<dyn ProgressReporter> = if cli.progress {
        Arc::new(ConsoleProgressReporter::new(cli.verbose > 0))
    } else {
        Arc::new(NoOpProgressReporter)
    };
    let processor = Arc::new(
        LogoProcessor::with_reporter(config, reporter).context("Failed to create processor")?,
    );

    let progress_bar = if !cli.progress && items.len() > 1 {
        let pb = ProgressBar::new(items.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start_time = Instant::now();
    let jobs = cli.jobs.max(1);
    let batch_span = spans::batch_processing(&session_id, items.len(), jobs);
    run_batch(
        &processor,
        items,
        &output_dir,
        jobs,
        &mut report,
        progress_bar.as_ref(),
    )
    .instrument(batch_span)
    .await?;
    if let Some(pb) = progress_bar {
        pb.finish_with_message("done");
    }

    report.finish();
    events::performance_metric(
        "batch",
        start_time.elapsed().as_millis() as u64,
        report.summary().total,
    );

    if let Some(path) = &cli.report {
        report
            .write_json(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    let summary = report.summary();
    info!(
        "Processed {} logo(s) in {:.2}s ({} failed, {} skipped)",
        summary.processed,
        start_time.elapsed().as_secs_f64(),
        summary.failed,
        summary.skipped
    );

    if summary.failed > 0 {
        for failure in report.failures() {
            if let FileOutcome::Failed { reason, .. } = &failure.outcome {
                eprintln!("  {}: {}", failure.input.display(), reason);
            }
        }
        anyhow::bail!(
            "{} of {} logo(s) failed",
            summary.failed,
            summary.total - summary.skipped
        );
    }

    Ok(())
}

/// Run all items, at most `jobs` at a time, recording results in input order
async fn run_batch(
    processor: &Arc<LogoProcessor>,
    items: Vec<BatchItem>,
    output_dir: &Path,
    jobs: usize,
    report: &mut BatchReport,
    progress_bar: Option<&ProgressBar>,
) -> Result<()> {
    let mut results = futures::stream::iter(items.into_iter().map(|item| {
        let processor = Arc::clone(processor);
        let output_dir = output_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let _span = spans::file_processing(&item.input, &item.target()).entered();
            process_item(&processor, &item, &output_dir)
        })
    }))
    .buffered(jobs);

    while let Some(joined) = results.next().await {
        let file_report = joined.context("Logo worker task failed")?;

        if let FileOutcome::Failed { reason, .. } = &file_report.outcome {
            events::error_with_context(reason, &file_report.input.display().to_string());
        }
        if let Some(pb) = progress_bar {
            pb.set_message(format!("{}", file_report.input.display()));
            pb.inc(1);
        }
        report.push(file_report);
    }

    Ok(())
}

fn prepare_output_dir(output_dir: &Path) -> Result<()> {
    if output_dir.is_file() {
        anyhow::bail!(
            "Output path exists and is a file, not a directory: {}",
            output_dir.display()
        );
    }
    std::fs::create_dir_all(output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            output_dir.display()
        )
    })
}

/// Directory where manifest sources are looked up when not passed explicitly
fn source_dir(cli: &Cli) -> PathBuf {
    cli.input
        .iter()
        .map(PathBuf::from)
        .find(|p| p.is_dir())
        .or_else(|| {
            cli.manifest
                .as_ref()
                .and_then(|m| m.parent())
                .map(Path::to_path_buf)
        })
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Files to process and generated outputs that were skipped
#[derive(Debug, Default, PartialEq)]
pub(crate) struct CollectedInputs {
    pub(crate) files: Vec<PathBuf>,
    pub(crate) skipped: Vec<PathBuf>,
}

/// Expand file and directory inputs into a sorted, de-duplicated file list
///
/// Explicit file paths that do not exist are kept so they surface as missing
/// inputs in the batch report.
pub(crate) fn collect_inputs(
    inputs: &[String],
    recursive: bool,
    pattern: Option<&str>,
) -> Result<CollectedInputs> {
    let pattern = pattern
        .map(|pat| {
            glob::Pattern::new(pat).with_context(|| format!("Invalid --pattern '{}'", pat))
        })
        .transpose()?;
    let mut collected = CollectedInputs::default();

    for input in inputs {
        let path = PathBuf::from(input);

        if path.is_dir() {
            let found = find_logo_files(&path, recursive, pattern.as_ref())?;
            collected.files.extend(found.files);
            collected.skipped.extend(found.skipped);
        } else if is_dark_output(&path) {
            collected.skipped.push(path);
        } else if path.exists() && !is_supported_input(&path) {
            warn!("Skipping unsupported file: {}", path.display());
        } else {
            collected.files.push(path);
        }
    }

    collected.files.sort();
    collected.files.dedup();
    collected.skipped.sort();
    collected.skipped.dedup();
    Ok(collected)
}

fn find_logo_files(
    dir: &Path,
    recursive: bool,
    pattern: Option<&glob::Pattern>,
) -> Result<CollectedInputs> {
    let mut collected = CollectedInputs::default();
    let mut consider = |path: PathBuf| {
        if !is_supported_input(&path) || !matches_pattern(&path, pattern) {
            return;
        }
        if is_dark_output(&path) {
            collected.skipped.push(path);
        } else {
            collected.files.push(path);
        }
    };

    if recursive {
        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.with_context(|| format!("Failed to walk {}", dir.display()))?;
            if entry.file_type().is_file() {
                consider(entry.into_path());
            }
        }
    } else {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("Failed to read directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                consider(entry.path());
            }
        }
    }

    Ok(collected)
}

/// Check if the file name matches the given pattern
fn matches_pattern(path: &Path, pattern: Option<&glob::Pattern>) -> bool {
    match pattern {
        Some(pattern) => path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|filename| pattern.matches(filename)),
        None => true,
    }
}
