//! Shared constants used across the application.

use std::time::Duration;

/// User agent sent when fetching logos from their source sites.
pub const DOWNLOADER_USER_AGENT: &str = "gsoc-logo-downloader/1.0";

/// Timeout for a single logo download, connect through last byte.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Write buffer size used while streaming a download to disk.
pub const DOWNLOAD_CHUNK_SIZE: usize = 8 * 1024;

/// Collection holding organization documents.
pub const ORGANIZATIONS_COLLECTION: &str = "organizations";

/// Object key used by the store smoke test.
pub const SMOKE_TEST_KEY: &str = "test-sample-gsoc-logo.png";

/// Places the store smoke test looks for a sample image, in order.
pub const SMOKE_TEST_IMAGE_CANDIDATES: [&str; 3] = [
    "../test-image.jpg",
    "test-image.jpg",
    "../api-data-scrapper/test-image.jpg",
];
