//! Per-record results and run totals.

use std::fmt;

use thiserror::Error;
use tracing::info;

/// Why a record was passed over without any work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NoSourceUrl,
    NoImageSlug,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSourceUrl => f.write_str("no image_url or logoUrl"),
            Self::NoImageSlug => f.write_str("no image_slug"),
        }
    }
}

/// Pipeline step a record failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Download,
    Upload,
    RecordUpdate,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Download => f.write_str("download"),
            Self::Upload => f.write_str("upload"),
            Self::RecordUpdate => f.write_str("database update"),
        }
    }
}

/// A record's processing stopped at `stage`.
#[derive(Debug, Error)]
#[error("{stage} failed: {cause:#}")]
pub struct RecordError {
    pub stage: Stage,
    pub cause: anyhow::Error,
}

impl RecordError {
    #[must_use]
    pub fn new(stage: Stage, cause: anyhow::Error) -> Self {
        Self { stage, cause }
    }
}

/// Successful end states of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Success {
    /// Uploaded and recorded on the organization.
    Published { key: String, public_url: String },
    /// Downloaded; upload and database write suppressed.
    DryRun { key: String, public_url: String },
    /// Download-only run fetched the file.
    Downloaded { key: String, bytes: u64 },
    /// Download-only run found the file already on disk.
    AlreadyPresent { key: String, bytes: u64 },
}

/// What the per-record handler did when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Skipped(SkipReason),
    Done(Success),
}

/// Final state of one record, as counted by the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Skipped { reason: SkipReason },
    Succeeded(Success),
    Failed { stage: Stage, cause: String },
}

impl From<Result<Handled, RecordError>> for RecordOutcome {
    fn from(result: Result<Handled, RecordError>) -> Self {
        match result {
            Ok(Handled::Skipped(reason)) => Self::Skipped { reason },
            Ok(Handled::Done(success)) => Self::Succeeded(success),
            Err(e) => Self::Failed {
                stage: e.stage,
                cause: format!("{:#}", e.cause),
            },
        }
    }
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub published: usize,
    pub dry_run: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncSummary {
    pub fn record(&mut self, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Failed { .. } => self.failed += 1,
            RecordOutcome::Succeeded(success) => match success {
                Success::Published { .. } => self.published += 1,
                Success::DryRun { .. } => self.dry_run += 1,
                Success::Downloaded { .. } => self.downloaded += 1,
                Success::AlreadyPresent { .. } => self.already_present += 1,
            },
        }
    }

    /// Records that reached a successful end state, including files already on disk.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.published + self.dry_run + self.downloaded + self.already_present
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded() + self.skipped + self.failed
    }

    pub fn log(&self) {
        info!(
            total = self.total(),
            succeeded = self.succeeded(),
            published = self.published,
            dry_run = self.dry_run,
            downloaded = self.downloaded,
            already_present = self.already_present,
            skipped = self.skipped,
            failed = self.failed,
            "[done] Processed {} organizations",
            self.total()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_result() {
        let skipped = RecordOutcome::from(Ok(Handled::Skipped(SkipReason::NoImageSlug)));
        assert_eq!(
            skipped,
            RecordOutcome::Skipped {
                reason: SkipReason::NoImageSlug
            }
        );

        let failed = RecordOutcome::from(Err(RecordError::new(
            Stage::Upload,
            anyhow::anyhow!("bucket missing"),
        )));
        assert_eq!(
            failed,
            RecordOutcome::Failed {
                stage: Stage::Upload,
                cause: "bucket missing".to_string()
            }
        );
    }

    #[test]
    fn test_summary_keeps_download_states_apart() {
        let mut summary = SyncSummary::default();
        summary.record(&RecordOutcome::Succeeded(Success::Downloaded {
            key: "a.png".to_string(),
            bytes: 10,
        }));
        summary.record(&RecordOutcome::Succeeded(Success::AlreadyPresent {
            key: "b.png".to_string(),
            bytes: 12,
        }));
        summary.record(&RecordOutcome::Skipped {
            reason: SkipReason::NoSourceUrl,
        });
        summary.record(&RecordOutcome::Failed {
            stage: Stage::Download,
            cause: "404".to_string(),
        });

        assert_eq!(summary.downloaded, 1);
        assert_eq!(summary.already_present, 1);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn test_record_error_display_includes_stage() {
        let err = RecordError::new(Stage::RecordUpdate, anyhow::anyhow!("no match"));
        assert_eq!(err.to_string(), "database update failed: no match");
    }
}
