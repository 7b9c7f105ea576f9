use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::info;

use super::ObjectStore;
use crate::constants::{SMOKE_TEST_IMAGE_CANDIDATES, SMOKE_TEST_KEY};

/// Result of publishing one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Publication {
    pub key: String,
    pub public_url: String,
    /// False when the upload was suppressed by dry run.
    pub uploaded: bool,
}

/// Uploads files to an [`ObjectStore`], or only reports what it would upload.
pub struct Publisher<'a> {
    store: &'a dyn ObjectStore,
    dry_run: bool,
}

impl<'a> Publisher<'a> {
    #[must_use]
    pub fn new(store: &'a dyn ObjectStore, dry_run: bool) -> Self {
        Self { store, dry_run }
    }

    /// Upload `local_path` under `key`, returning where it will be served from.
    ///
    /// In dry-run mode the store is never contacted.
    ///
    /// # Errors
    ///
    /// Returns an error if the upload fails.
    pub async fn publish(
        &self,
        local_path: &Path,
        key: &str,
        content_type: &str,
    ) -> Result<Publication> {
        let public_url = self.store.public_url(key);

        if self.dry_run {
            info!(
                key = %key,
                content_type = %content_type,
                public_url = %public_url,
                "[dry-run] Would upload to R2"
            );
            return Ok(Publication {
                key: key.to_string(),
                public_url,
                uploaded: false,
            });
        }

        info!(key = %key, content_type = %content_type, "Uploading to R2");
        self.store.put_file(local_path, key, content_type).await?;

        Ok(Publication {
            key: key.to_string(),
            public_url,
            uploaded: true,
        })
    }
}

/// First existing sample image: `explicit` when given, otherwise the first
/// of the conventional locations that exists.
///
/// # Errors
///
/// Returns an error naming every path tried when none exists.
pub fn find_sample_image(explicit: Option<PathBuf>) -> Result<PathBuf> {
    let candidates: Vec<PathBuf> = match explicit {
        Some(path) => vec![path],
        None => SMOKE_TEST_IMAGE_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .collect(),
    };

    candidates
        .iter()
        .find(|path| path.is_file())
        .cloned()
        .ok_or_else(|| {
            let tried: Vec<String> = candidates
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            anyhow::anyhow!("No sample image found, tried: {}", tried.join(", "))
        })
}

/// Upload `sample` under the fixed smoke-test key to verify store credentials.
///
/// # Errors
///
/// Returns an error if the upload fails.
pub async fn check_store(
    store: &dyn ObjectStore,
    sample: &Path,
    upload: bool,
) -> Result<Publication> {
    let size = tokio::fs::metadata(sample).await?.len();
    info!(path = %sample.display(), bytes = size, key = SMOKE_TEST_KEY, "Store check sample");

    Publisher::new(store, !upload)
        .publish(sample, SMOKE_TEST_KEY, "image/png")
        .await
}
