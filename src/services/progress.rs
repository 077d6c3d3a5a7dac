//! Progress reporting service
//!
//! This module separates progress reporting concerns from the pixel pipeline,
//! allowing different frontends to implement their own progress handling.

use crate::types::ProcessingTimings;
use instant::Instant;
use std::sync::Arc;

/// Progress stages while processing one logo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Reading and decoding the input file
    Loading,
    /// Manifest-driven crop, trim and recolor
    PreAdjust,
    /// Removing the background color
    Keying,
    /// Making content dark-toned
    Normalizing,
    /// Deriving the white silhouette
    DarkVariant,
    /// Scaling both variants onto the canvas
    Fitting,
    /// Encoding and writing PNG files
    Encoding,
    /// Processing completed
    Completed,
}

impl ProcessingStage {
    /// Get a human-readable description of the processing stage
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            ProcessingStage::Loading => "Loading input image",
            ProcessingStage::PreAdjust => "Applying asset adjustments",
            ProcessingStage::Keying => "Keying out background",
            ProcessingStage::Normalizing => "Normalizing content tone",
            ProcessingStage::DarkVariant => "Deriving dark variant",
            ProcessingStage::Fitting => "Fitting to canvas",
            ProcessingStage::Encoding => "Writing PNG outputs",
            ProcessingStage::Completed => "Processing completed",
        }
    }

    /// Get the typical progress percentage for this stage
    #[must_use]
    pub fn progress_percentage(&self) -> u8 {
        match self {
            ProcessingStage::Loading => 5,
            ProcessingStage::PreAdjust => 15,
            ProcessingStage::Keying => 25,
            ProcessingStage::Normalizing => 40,
            ProcessingStage::DarkVariant => 50,
            ProcessingStage::Fitting => 60,
            ProcessingStage::Encoding => 85,
            ProcessingStage::Completed => 100,
        }
    }
}

/// Progress update containing stage and timing information
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Current processing stage
    pub stage: ProcessingStage,
    /// Progress percentage (0-100)
    pub progress: u8,
    /// Human-readable stage description
    pub description: String,
    /// Elapsed time since processing started (milliseconds)
    pub elapsed_ms: u64,
}

impl ProgressUpdate {
    /// Create a new progress update
    #[must_use]
    pub fn new(stage: ProcessingStage, start_time: Instant) -> Self {
        Self {
            progress: stage.progress_percentage(),
            description: stage.description().to_string(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
        }
    }

    /// Create a progress update with custom description
    #[must_use]
    pub fn with_description(
        stage: ProcessingStage,
        description: String,
        start_time: Instant,
    ) -> Self {
        Self {
            progress: stage.progress_percentage(),
            elapsed_ms: start_time.elapsed().as_millis() as u64,
            stage,
            description,
        }
    }
}

/// Trait for reporting progress while processing logos
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update
    fn report_progress(&self, update: ProgressUpdate);

    /// Report processing completion with final timings
    fn report_completion(&self, timings: ProcessingTimings);

    /// Report an error during processing
    fn report_error(&self, stage: ProcessingStage, error: &str);
}

/// No-op progress reporter that discards all progress updates
pub struct NoOpProgressReporter;

impl ProgressReporter for NoOpProgressReporter {
    fn report_progress(&self, _update: ProgressUpdate) {}

    fn report_completion(&self, _timings: ProcessingTimings) {}

    fn report_error(&self, _stage: ProcessingStage, _error: &str) {}
}

/// Console progress reporter that logs progress through the `log` facade
pub struct ConsoleProgressReporter {
    verbose: bool,
}

impl ConsoleProgressReporter {
    /// Create a new console progress reporter
    ///
    /// With `verbose` set, elapsed times and a timing breakdown are included.
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report_progress(&self, update: ProgressUpdate) {
        if self.verbose {
            log::info!(
                "[{}%] {} ({}ms elapsed)",
                update.progress,
                update.description,
                update.elapsed_ms
            );
        } else {
            log::debug!("[{}%] {}", update.progress, update.description);
        }
    }

    fn report_completion(&self, timings: ProcessingTimings) {
        log::info!("Logo processed in {}ms", timings.total_ms);

        if self.verbose {
            let breakdown = timings.breakdown_percentages();
            log::info!("  Detailed timings:");
            log::info!(
                "    Decode: {}ms ({:.1}%)",
                timings.decode_ms,
                breakdown.decode_pct
            );
            log::info!(
                "    Adjust: {}ms ({:.1}%)",
                timings.adjust_ms,
                breakdown.adjust_pct
            );
            log::info!(
                "    Keying: {}ms ({:.1}%)",
                timings.keying_ms,
                breakdown.keying_pct
            );
            log::info!(
                "    Normalize: {}ms ({:.1}%)",
                timings.normalize_ms,
                breakdown.normalize_pct
            );
            log::info!(
                "    Compose: {}ms ({:.1}%)",
                timings.compose_ms,
                breakdown.compose_pct
            );
            if let Some(encode_ms) = timings.encode_ms {
                log::info!("    Encode: {}ms ({:.1}%)", encode_ms, breakdown.encode_pct);
            }
        }
    }

    fn report_error(&self, stage: ProcessingStage, error: &str) {
        log::error!("Error during {}: {}", stage.description(), error);
    }
}

/// Per-file progress tracker that forwards to a shared reporter
pub struct ProgressTracker {
    reporter: Arc<dyn ProgressReporter>,
    start_time: Instant,
    current_stage: Option<ProcessingStage>,
}

impl ProgressTracker {
    /// Create a new progress tracker with the specified reporter
    #[must_use]
    pub fn new(reporter: Arc<dyn ProgressReporter>) -> Self {
        Self {
            reporter,
            start_time: Instant::now(),
            current_stage: None,
        }
    }

    /// Create a progress tracker with no-op reporter
    #[must_use]
    pub fn no_op() -> Self {
        Self::new(Arc::new(NoOpProgressReporter))
    }

    /// Create a progress tracker with console reporter
    #[must_use]
    pub fn console(verbose: bool) -> Self {
        Self::new(Arc::new(ConsoleProgressReporter::new(verbose)))
    }

    /// Report progress for a specific stage
    pub fn report_stage(&mut self, stage: ProcessingStage) {
        self.current_stage = Some(stage);
        self.reporter
            .report_progress(ProgressUpdate::new(stage, self.start_time));
    }

    /// Report progress with custom description
    pub fn report_stage_with_description(&mut self, stage: ProcessingStage, description: String) {
        self.current_stage = Some(stage);
        let update = ProgressUpdate::with_description(stage, description, self.start_time);
        self.reporter.report_progress(update);
    }

    /// Report completion with final timings
    pub fn report_completion(&self, timings: ProcessingTimings) {
        self.reporter.report_completion(timings);
    }

    /// Report an error at the current stage
    pub fn report_error(&self, error: &str) {
        let stage = self.current_stage.unwrap_or(ProcessingStage::Loading);
        self.reporter.report_error(stage, error);
    }

    /// Get the elapsed time since tracking started
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Get the current processing stage
    #[must_use]
    pub fn current_stage(&self) -> Option<ProcessingStage> {
        self.current_stage
    }
}
