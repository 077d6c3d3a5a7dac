//! Batch planning and reporting
//!
//! A batch is a sorted list of inputs, each processed independently. Failures
//! are recorded per file and never stop the remaining work.

use crate::{
    config::PipelineConfig,
    error::{LogoError, Result},
    manifest::{AssetOverrides, Manifest},
    processor::LogoProcessor,
    services::format::default_target_name,
    types::WrittenOutputs,
};
use chrono::{DateTime, Utc};
use instant::Instant;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One input scheduled for processing
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub input: PathBuf,
    pub overrides: Option<AssetOverrides>,
}

impl BatchItem {
    #[must_use]
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            overrides: None,
        }
    }

    /// Output base name for this item
    #[must_use]
    pub fn target(&self) -> String {
        self.overrides
            .as_ref()
            .and_then(|o| o.target.clone())
            .unwrap_or_else(|| default_target_name(&self.input))
    }
}

/// Pair collected files with manifest entries
///
/// Files are matched to manifest entries by file name. Manifest entries with no
/// collected file are scheduled as `source_dir/<name>` so that a missing source
/// shows up as a failure in the report. The result is sorted by input path.
#[must_use]
pub fn plan_batch(files: Vec<PathBuf>, manifest: Option<&Manifest>, source_dir: &Path) -> Vec<BatchItem> {
    let mut items: Vec<BatchItem> = files
        .into_iter()
        .map(|input| {
            let overrides = manifest.and_then(|m| {
                input
                    .file_name()
                    .and_then(|name| name.to_str())
                    .and_then(|name| m.overrides_for(name))
                    .cloned()
            });
            BatchItem { input, overrides }
        })
        .collect();

    if let Some(manifest) = manifest {
        for (name, overrides) in &manifest.assets {
            let collected = items
                .iter()
                .any(|item| item.input.file_name().and_then(|n| n.to_str()) == Some(name.as_str()));
            if !collected {
                items.push(BatchItem {
                    input: source_dir.join(name),
                    overrides: Some(overrides.clone()),
                });
            }
        }
    }

    items.sort_by(|a, b| a.input.cmp(&b.input));
    items
}

/// Result of one input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Success { outputs: WrittenOutputs },
    Failed { kind: FailureKind, reason: String },
    Skipped { reason: String },
}

/// Category of a per-file failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingInput,
    Decode,
    Write,
    Unsupported,
    Other,
}

impl From<&LogoError> for FailureKind {
    fn from(error: &LogoError) -> Self {
        match error {
            LogoError::MissingInput(_) => Self::MissingInput,
            LogoError::Read(_) | LogoError::Decode(_) | LogoError::Image(_) => Self::Decode,
            LogoError::Encode(_) | LogoError::Io(_) => Self::Write,
            LogoError::UnsupportedFormat(_) => Self::Unsupported,
            _ => Self::Other,
        }
    }
}

/// Per-file entry in a batch report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileReport {
    pub input: PathBuf,
    pub target: String,
    pub duration_ms: u64,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

impl FileReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FileOutcome::Success { .. })
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, FileOutcome::Failed { .. })
    }
}

/// Process one item, turning any error into a failed entry
pub fn process_item(processor: &LogoProcessor, item: &BatchItem, output_dir: &Path) -> FileReport {
    let start = Instant::now();
    let target = item.target();

    let outcome = match processor.process_file_with_overrides(
        &item.input,
        output_dir,
        item.overrides.as_ref(),
    ) {
        Ok(outputs) => FileOutcome::Success { outputs },
        Err(e) => {
            warn!(input = %item.input.display(), error = %e, "logo failed");
            FileOutcome::Failed {
                kind: FailureKind::from(&e),
                reason: e.to_string(),
            }
        },
    };

    FileReport {
        input: item.input.clone(),
        target,
        duration_ms: start.elapsed().as_millis() as u64,
        outcome,
    }
}

/// Summary counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub processed: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Report of a whole batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub config: PipelineConfig,
    pub summary: BatchSummary,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    #[must_use]
    pub fn new(config: PipelineConfig, session_id: Option<String>) -> Self {
        Self {
            session_id,
            started_at: Utc::now(),
            finished_at: None,
            config,
            summary: BatchSummary::default(),
            files: Vec::new(),
        }
    }

    pub fn push(&mut self, report: FileReport) {
        self.summary.total += 1;
        match report.outcome {
            FileOutcome::Success { .. } => self.summary.processed += 1,
            FileOutcome::Failed { .. } => self.summary.failed += 1,
            FileOutcome::Skipped { .. } => self.summary.skipped += 1,
        }
        self.files.push(report);
    }

    /// Record an input that was deliberately not processed
    pub fn record_skipped(&mut self, input: PathBuf, reason: &str) {
        let target = default_target_name(&input);
        self.push(FileReport {
            input,
            target,
            duration_ms: 0,
            outcome: FileOutcome::Skipped {
                reason: reason.to_string(),
            },
        });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
        info!(
            total = self.summary.total,
            processed = self.summary.processed,
            failed = self.summary.failed,
            skipped = self.summary.skipped,
            "batch finished"
        );
    }

    #[must_use]
    pub fn summary(&self) -> BatchSummary {
        self.summary
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&FileReport> {
        self.files.iter().filter(|f| f.is_failure()).collect()
    }

    /// Write the report as pretty-printed JSON
    ///
    /// # Errors
    /// - Report cannot be serialized
    /// - File cannot be written
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| LogoError::processing(format!("failed to serialize report: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| LogoError::file_io_error("create report directory", parent, &e))?;
        }
        std::fs::write(path, json).map_err(|e| LogoError::file_io_error("write report", path, &e))
    }
}

/// Process items sequentially in the given order
pub fn run_sequential(
    processor: &LogoProcessor,
    items: &[BatchItem],
    output_dir: &Path,
    report: &mut BatchReport,
) {
    for item in items {
        report.push(process_item(processor, item, output_dir));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest() -> Manifest {
        Manifest::from_json(
            r#"{ "assets": {
                "b.png": { "target": "bravo" },
                "ghost.png": { "target": "ghost" }
            } }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_plan_matches_manifest_and_sorts() {
        let files = vec![PathBuf::from("in/c.png"), PathBuf::from("in/b.png")];
        let items = plan_batch(files, Some(&manifest()), Path::new("in"));

        let inputs: Vec<_> = items.iter().map(|i| i.input.clone()).collect();
        assert_eq!(
            inputs,
            vec![
                PathBuf::from("in/b.png"),
                PathBuf::from("in/c.png"),
                PathBuf::from("in/ghost.png"),
            ]
        );
        assert_eq!(items[0].target(), "bravo");
        assert_eq!(items[1].target(), "c");
        assert!(items[1].overrides.is_none());
        assert_eq!(items[2].target(), "ghost");
    }

    #[test]
    fn test_plan_without_manifest() {
        let files = vec![PathBuf::from("z.png"), PathBuf::from("a-dark.jpg")];
        let items = plan_batch(files, None, Path::new("."));
        assert_eq!(items[0].input, PathBuf::from("a-dark.jpg"));
        assert_eq!(items[0].target(), "a");
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(
            FailureKind::from(&LogoError::missing_input("x.png")),
            FailureKind::MissingInput
        );
        assert_eq!(
            FailureKind::from(&LogoError::decode_error("x.png", "bad")),
            FailureKind::Decode
        );
        assert_eq!(
            FailureKind::from(&LogoError::encode_error("x.png", "disk full")),
            FailureKind::Write
        );
        assert_eq!(
            FailureKind::from(&LogoError::invalid_config("x")),
            FailureKind::Other
        );
    }

    #[test]
    fn test_unreadable_input_is_not_a_write_failure() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(
            FailureKind::from(&LogoError::read_error("read input", "x.png", &denied)),
            FailureKind::Decode
        );
        assert_eq!(
            FailureKind::from(&LogoError::file_io_error("create output directory", "out", &denied)),
            FailureKind::Write
        );
    }

    #[test]
    fn test_report_counts_and_json() {
        let mut report = BatchReport::new(PipelineConfig::default(), Some("run-1".to_string()));
        report.push(FileReport {
            input: PathBuf::from("a.png"),
            target: "a".to_string(),
            duration_ms: 3,
            outcome: FileOutcome::Success {
                outputs: WrittenOutputs::Variants {
                    light: PathBuf::from("out/a.png"),
                    dark: PathBuf::from("out/a-dark.png"),
                },
            },
        });
        report.push(FileReport {
            input: PathBuf::from("b.png"),
            target: "b".to_string(),
            duration_ms: 1,
            outcome: FileOutcome::Failed {
                kind: FailureKind::MissingInput,
                reason: "Missing input".to_string(),
            },
        });
        report.record_skipped(PathBuf::from("a-dark.png"), "generated dark variant");
        report.finish();

        assert_eq!(
            report.summary(),
            BatchSummary {
                total: 3,
                processed: 1,
                failed: 1,
                skipped: 1
            }
        );
        assert_eq!(report.failures().len(), 1);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][1]["status"], "failed");
        assert_eq!(json["files"][1]["kind"], "missing_input");
        assert_eq!(json["files"][0]["outputs"]["kind"], "variants");
        assert!(json["started_at"].as_str().unwrap().contains('T'));

        let parsed: BatchReport = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, report);
    }
}
