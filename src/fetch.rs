//! Streaming logo downloads from source URLs.

use std::path::Path;

use anyhow::{Context, Result};
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::constants::{DOWNLOADER_USER_AGENT, DOWNLOAD_CHUNK_SIZE, DOWNLOAD_TIMEOUT};

/// HTTP downloader for logo assets.
#[derive(Debug, Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    /// Create a downloader with the fixed user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .user_agent(DOWNLOADER_USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Stream `url` into the file at `dest`, replacing any existing file.
    ///
    /// Returns the number of bytes written. A failed download may leave a
    /// partial file behind.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, a non-success status, or a write error.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {url}"))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("HTTP request for {url} failed with status {status}");
        }

        let file = tokio::fs::File::create(dest)
            .await
            .with_context(|| format!("Failed to create {}", dest.display()))?;
        let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);

        let mut written: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.with_context(|| format!("Failed to read body of {url}"))?;
            writer
                .write_all(&chunk)
                .await
                .with_context(|| format!("Failed to write {}", dest.display()))?;
            written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .with_context(|| format!("Failed to flush {}", dest.display()))?;

        debug!(url = %url, path = %dest.display(), bytes = written, "Download complete");
        Ok(written)
    }
}
