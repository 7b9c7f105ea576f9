//! Sequential logo sync over selected organizations.
//!
//! Each record goes through download, then (when publishing) upload and the
//! database write, before the next record starts. A record's failure is
//! counted and logged but never stops the run.

mod outcome;

pub use outcome::{Handled, RecordError, RecordOutcome, SkipReason, Stage, Success, SyncSummary};

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use crate::db::{LogoRecord, Organization, OrganizationStore, Selection};
use crate::fetch::Downloader;
use crate::naming::{content_type, storage_key};
use crate::s3::{ObjectStore, Publisher};

/// What a run does with each selected organization.
#[derive(Clone, Copy)]
pub enum RunMode<'a> {
    /// Download, upload to the object store, and record the URL.
    Publish {
        store: &'a dyn ObjectStore,
        dry_run: bool,
    },
    /// Only download into the logos directory.
    DownloadOnly { force: bool },
}

impl RunMode<'_> {
    /// Selection used when no slugs are given on the command line.
    #[must_use]
    pub fn default_selection(&self) -> Selection {
        match self {
            Self::Publish { .. } => Selection::MissingPublishedUrl,
            Self::DownloadOnly { .. } => Selection::AllEligible,
        }
    }
}

impl std::fmt::Debug for RunMode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Publish { dry_run, .. } => {
                f.debug_struct("Publish").field("dry_run", dry_run).finish()
            }
            Self::DownloadOnly { force } => {
                f.debug_struct("DownloadOnly").field("force", force).finish()
            }
        }
    }
}

/// Drives one batch run.
pub struct LogoSync<'a> {
    orgs: &'a dyn OrganizationStore,
    downloader: Downloader,
    logos_dir: PathBuf,
    sleep_between: Duration,
    mode: RunMode<'a>,
}

impl<'a> LogoSync<'a> {
    #[must_use]
    pub fn new(
        orgs: &'a dyn OrganizationStore,
        downloader: Downloader,
        logos_dir: PathBuf,
        sleep_between: Duration,
        mode: RunMode<'a>,
    ) -> Self {
        Self {
            orgs,
            downloader,
            logos_dir,
            sleep_between,
            mode,
        }
    }

    /// Process every organization matching `selection`.
    ///
    /// # Errors
    ///
    /// Returns an error only if the logos directory cannot be created or the
    /// selection query fails. Per-record failures are counted in the summary.
    pub async fn run(&self, selection: &Selection) -> Result<SyncSummary> {
        tokio::fs::create_dir_all(&self.logos_dir)
            .await
            .with_context(|| {
                format!(
                    "Failed to create logos directory: {}",
                    self.logos_dir.display()
                )
            })?;

        info!(
            mode = ?self.mode,
            logos_dir = %self.logos_dir.display(),
            selection = %selection.describe(),
            "Selecting organizations"
        );

        let orgs = self
            .orgs
            .find_organizations(selection)
            .await
            .context("Failed to select organizations")?;

        info!(count = orgs.len(), "Found organizations to process");

        let mut summary = SyncSummary::default();
        if orgs.is_empty() {
            info!("No organizations to process");
            return Ok(summary);
        }

        let total = orgs.len();
        for (idx, org) in orgs.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, total, org.display_id());

            let outcome = RecordOutcome::from(self.process(org).await);
            log_outcome(org, &outcome);
            summary.record(&outcome);

            if idx + 1 < total && !self.sleep_between.is_zero() {
                tokio::time::sleep(self.sleep_between).await;
            }
        }

        summary.log();
        info!(logos_dir = %self.logos_dir.display(), "Logos saved");
        Ok(summary)
    }

    /// Handle a single organization.
    ///
    /// # Errors
    ///
    /// Returns the stage that failed along with its cause.
    pub async fn process(&self, org: &Organization) -> Result<Handled, RecordError> {
        let Some(source_url) = org.source_url() else {
            return Ok(Handled::Skipped(SkipReason::NoSourceUrl));
        };
        let Some(image_slug) = org.image_slug() else {
            return Ok(Handled::Skipped(SkipReason::NoImageSlug));
        };

        let key = storage_key(image_slug, source_url);
        let local_path = self.logos_dir.join(&key);

        info!(
            canonical_id = %org.display_id(),
            slug = org.slug.as_deref().unwrap_or_default(),
            image_slug,
            url = %source_url,
            "Processing organization"
        );

        match self.mode {
            RunMode::DownloadOnly { force } => {
                if !force {
                    if let Some(bytes) = existing_file_size(&local_path).await {
                        info!(path = %local_path.display(), bytes, "[skip] Already exists");
                        return Ok(Handled::Done(Success::AlreadyPresent { key, bytes }));
                    }
                }

                let bytes = self.download(source_url, &local_path).await?;
                Ok(Handled::Done(Success::Downloaded { key, bytes }))
            }
            RunMode::Publish { store, dry_run } => {
                self.download(source_url, &local_path).await?;
                self.publish(org, store, dry_run, source_url, &key, &local_path)
                    .await
            }
        }
    }

    async fn download(&self, url: &str, local_path: &Path) -> Result<u64, RecordError> {
        info!(path = %local_path.display(), "Downloading");
        let bytes = self
            .downloader
            .download(url, local_path)
            .await
            .map_err(|e| RecordError::new(Stage::Download, e))?;
        info!(bytes, "Downloaded");
        Ok(bytes)
    }

    async fn publish(
        &self,
        org: &Organization,
        store: &dyn ObjectStore,
        dry_run: bool,
        source_url: &str,
        key: &str,
        local_path: &Path,
    ) -> Result<Handled, RecordError> {
        let publication = Publisher::new(store, dry_run)
            .publish(local_path, key, content_type(source_url))
            .await
            .map_err(|e| {
                warn!(path = %local_path.display(), "Upload failed, keeping local file");
                RecordError::new(Stage::Upload, e)
            })?;

        if !publication.uploaded {
            info!(
                canonical_id = %org.display_id(),
                path = %local_path.display(),
                "[dry-run] Would update MongoDB; downloaded file kept"
            );
            return Ok(Handled::Done(Success::DryRun {
                key: publication.key,
                public_url: publication.public_url,
            }));
        }

        info!(public_url = %publication.public_url, "Uploaded");

        let record = LogoRecord::new(publication.key.clone(), publication.public_url.clone());
        let updated = match org.canonical_id() {
            Some(canonical_id) => self.orgs.record_logo(canonical_id, &record).await,
            None => Err(anyhow::anyhow!("Organization has no canonical_id")),
        };
        if let Err(e) = updated {
            warn!(
                canonical_id = %org.display_id(),
                key = %publication.key,
                path = %local_path.display(),
                "Upload succeeded but database update failed; local file kept for replay"
            );
            return Err(RecordError::new(Stage::RecordUpdate, e));
        }

        info!(canonical_id = %org.display_id(), "Updated MongoDB");
        Ok(Handled::Done(Success::Published {
            key: publication.key,
            public_url: publication.public_url,
        }))
    }
}

async fn existing_file_size(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(std::fs::Metadata::is_file)
        .map(|meta| meta.len())
}

fn log_outcome(org: &Organization, outcome: &RecordOutcome) {
    let id = org.display_id();
    match outcome {
        RecordOutcome::Skipped { reason } => info!(canonical_id = %id, "[skip] {reason}"),
        RecordOutcome::Succeeded(_) => info!(canonical_id = %id, "[success] Completed"),
        RecordOutcome::Failed { stage, cause } => {
            error!(canonical_id = %id, stage = %stage, "[error] {cause}");
        }
    }
}
