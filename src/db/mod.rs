//! Metadata store for album-dl
//!
//! Handles SQLite persistence of album records.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`albums`] - Album record insert and listing
//! - [`duplicates`] - Duplicate detection queries and dedup keys
//! - [`store`] - [`MetadataStore`] implementation used by the pipeline

use crate::config::MetadataKey;
use crate::error::{DatabaseError, Error, Result};
use crate::types::AlbumRecord;
use chrono::NaiveDate;
use sqlx::{FromRow, sqlite::SqlitePool};

mod albums;
mod duplicates;
mod migrations;
mod store;

pub use store::MetadataStore;

/// Storage format of `publish_date`
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Album record as stored in the database
#[derive(Debug, Clone, FromRow)]
pub struct StoredAlbum {
    /// Unique database ID
    pub id: i64,
    /// Album title
    pub title: String,
    /// Album page URL
    pub source_url: String,
    /// Publication date as `YYYY-MM-DD`
    pub publish_date: String,
    /// Publisher name
    pub author: String,
    /// Image URLs as a JSON array
    pub images: String,
    /// Number of images in the record
    pub image_count: i64,
    /// Unix timestamp when the record was stored
    pub created_at: i64,
}

impl StoredAlbum {
    /// Convert the row back into the domain record
    pub fn to_record(&self) -> Result<AlbumRecord> {
        let publish_date =
            NaiveDate::parse_from_str(&self.publish_date, DATE_FORMAT).map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Invalid publish_date '{}' for album {}: {}",
                    self.publish_date, self.id, e
                )))
            })?;
        let images: Vec<String> = serde_json::from_str(&self.images)?;

        Ok(AlbumRecord {
            title: self.title.clone(),
            source_url: self.source_url.clone(),
            publish_date,
            author: self.author.clone(),
            images,
        })
    }
}

/// Result of an insert-if-absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new row was written with this ID
    Inserted(i64),
    /// A row with the same dedup key already existed; nothing was written
    AlreadyExists,
}

/// Database handle for album-dl
pub struct Database {
    pool: SqlitePool,
    metadata_key: MetadataKey,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
