mod models;
mod queries;

pub use models::*;
pub use queries::*;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::ORGANIZATIONS_COLLECTION;

/// Read and update access to organization records.
#[async_trait]
pub trait OrganizationStore: Send + Sync {
    /// Fetch every organization matching `selection`, in query order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn find_organizations(&self, selection: &Selection) -> Result<Vec<Organization>>;

    /// Write the logo output fields onto the record with `canonical_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails or matches no record.
    async fn record_logo(&self, canonical_id: &str, record: &LogoRecord) -> Result<()>;
}

/// MongoDB-backed organization store.
#[derive(Debug, Clone)]
pub struct MongoOrganizations {
    collection: Collection<Organization>,
}

impl MongoOrganizations {
    /// Connect to MongoDB and bind the organizations collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the client
    /// cannot be created.
    pub async fn connect(config: &Config) -> Result<Self> {
        let client = Client::with_uri_str(&config.mongo_uri)
            .await
            .context("Failed to connect to MongoDB")?;
        let collection = client
            .database(&config.mongo_db)
            .collection::<Organization>(ORGANIZATIONS_COLLECTION);

        info!(database = %config.mongo_db, "Connected to MongoDB");
        Ok(Self { collection })
    }
}

#[async_trait]
impl OrganizationStore for MongoOrganizations {
    async fn find_organizations(&self, selection: &Selection) -> Result<Vec<Organization>> {
        let filter = selection.filter();
        debug!(filter = %filter, "Querying organizations");

        let mut find = self.collection.find(filter);
        if let Some((sort, limit)) = selection.sort_and_limit() {
            find = find.sort(sort).limit(limit);
        }

        let cursor = find.await.context("Failed to query organizations")?;
        cursor
            .try_collect::<Vec<_>>()
            .await
            .context("Failed to read organizations from cursor")
    }

    async fn record_logo(&self, canonical_id: &str, record: &LogoRecord) -> Result<()> {
        let uploaded_at = bson::DateTime::from_millis(record.uploaded_at.timestamp_millis());
        let result = self
            .collection
            .update_one(
                doc! { "canonical_id": canonical_id },
                doc! {
                    "$set": {
                        "logo_local_filename": record.local_filename.as_str(),
                        "logo_r2_url": record.public_url.as_str(),
                        "logo_uploaded_at": uploaded_at
                    }
                },
            )
            .await
            .context("Failed to update organization")?;

        if result.matched_count == 0 {
            anyhow::bail!("No organization matched canonical_id {canonical_id}");
        }

        debug!(canonical_id, modified = result.modified_count, "Recorded logo on organization");
        Ok(())
    }
}
