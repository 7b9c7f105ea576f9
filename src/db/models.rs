use chrono::{DateTime, Utc};
use mongodb::bson;
use serde::{Deserialize, Serialize};

/// An organization document from the `organizations` collection.
///
/// Only the fields this tool reads or writes are mapped; anything else on the
/// document is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Organization {
    #[serde(default)]
    pub canonical_id: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image_slug: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    /// Legacy source URL field, used when `image_url` is empty.
    #[serde(default, rename = "logoUrl")]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub logo_local_filename: Option<String>,
    #[serde(default)]
    pub logo_r2_url: Option<String>,
    #[serde(default)]
    pub logo_uploaded_at: Option<bson::DateTime>,
}

impl Organization {
    /// Source URL of the logo, preferring `image_url` over the legacy `logoUrl`.
    #[must_use]
    pub fn source_url(&self) -> Option<&str> {
        non_empty(self.image_url.as_deref()).or_else(|| non_empty(self.logo_url.as_deref()))
    }

    #[must_use]
    pub fn image_slug(&self) -> Option<&str> {
        non_empty(self.image_slug.as_deref())
    }

    /// Whether a published URL has already been recorded.
    #[must_use]
    pub fn is_published(&self) -> bool {
        non_empty(self.logo_r2_url.as_deref()).is_some()
    }

    #[must_use]
    pub fn canonical_id(&self) -> Option<&str> {
        non_empty(self.canonical_id.as_deref())
    }

    /// Identifier for log lines: the canonical id, or the slug when that is empty.
    #[must_use]
    pub fn display_id(&self) -> &str {
        self.canonical_id()
            .or_else(|| non_empty(self.slug.as_deref()))
            .unwrap_or("<unknown>")
    }
}

/// Output fields written back onto an organization after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoRecord {
    /// Storage key, which is also the local file name.
    pub local_filename: String,
    pub public_url: String,
    pub uploaded_at: DateTime<Utc>,
}

impl LogoRecord {
    #[must_use]
    pub fn new(local_filename: String, public_url: String) -> Self {
        Self {
            local_filename,
            public_url,
            uploaded_at: Utc::now(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}
