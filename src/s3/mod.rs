mod publish;

pub use publish::{check_store, find_sample_image, Publication, Publisher};

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use s3::creds::Credentials;
use s3::region::Region;
use s3::Bucket;
use tracing::debug;

use crate::config::StoreConfig;

/// R2 reports its region as `auto`.
const R2_REGION: &str = "auto";

/// Destination for published logo files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the file at `local_path` under `key` with `content_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the upload fails.
    async fn put_file(&self, local_path: &Path, key: &str, content_type: &str) -> Result<()>;

    /// Public URL an object stored under `key` will be served from.
    fn public_url(&self, key: &str) -> String;
}

/// S3 client wrapper targeting an R2 bucket.
#[derive(Clone)]
pub struct S3Client {
    bucket: Box<Bucket>,
    endpoint: String,
    public_base: Option<String>,
}

impl S3Client {
    /// Create a new S3 client from the R2 configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if client initialization fails.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .context("Failed to create S3 credentials")?;

        let endpoint = config.endpoint();
        let region = Region::Custom {
            region: R2_REGION.to_string(),
            endpoint: endpoint.clone(),
        };

        // R2 needs path-style addressing on the account endpoint
        let bucket = Bucket::new(&config.bucket, region, credentials)
            .context("Failed to create S3 bucket")?
            .with_path_style();

        Ok(Self {
            bucket,
            endpoint,
            public_base: config.public_url.clone(),
        })
    }

    /// Get the bucket name
    #[must_use]
    pub fn bucket_name(&self) -> String {
        self.bucket.name().to_string()
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn put_file(&self, local_path: &Path, key: &str, content_type: &str) -> Result<()> {
        let content = tokio::fs::read(local_path)
            .await
            .with_context(|| format!("Failed to read {} for upload", local_path.display()))?;

        debug!(
            key = %key,
            content_type = %content_type,
            bytes = content.len(),
            "Uploading file to R2"
        );

        let response = self
            .bucket
            .put_object_with_content_type(key, &content, content_type)
            .await
            .context("Failed to upload file to R2")?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            anyhow::bail!("R2 upload of {key} failed with status {status}");
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_url(
            self.public_base.as_deref(),
            &self.endpoint,
            &self.bucket_name(),
            key,
        )
    }
}

impl std::fmt::Debug for S3Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Client")
            .field("bucket", &self.bucket.name())
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Public URL for `key`: under the configured public base when there is one,
/// otherwise directly on the store endpoint.
#[must_use]
pub fn public_url(public_base: Option<&str>, endpoint: &str, bucket: &str, key: &str) -> String {
    match public_base {
        Some(base) => format!("{}/{key}", base.trim_end_matches('/')),
        None => format!("{endpoint}/{bucket}/{key}"),
    }
}
