//! Duplicate detection queries.

use crate::config::MetadataKey;
use crate::error::{DatabaseError, Error, Result};
use crate::types::AlbumRecord;
use sha2::{Digest, Sha256};

use super::{DATE_FORMAT, Database, StoredAlbum};

/// Serialize an image list the same way every time so equal lists compare equal as text
pub(super) fn images_json(images: &[String]) -> Result<String> {
    Ok(serde_json::to_string(images)?)
}

/// Unique key enforcing at most one row per identity
///
/// In document mode the key is the SHA-256 of the whole record, so any field change
/// produces a new key; in URL mode it is derived from the source URL alone.
pub(super) fn dedup_key(record: &AlbumRecord, metadata_key: MetadataKey) -> Result<String> {
    let mut hasher = Sha256::new();
    match metadata_key {
        MetadataKey::Document => {
            hasher.update(b"document:");
            hasher.update(serde_json::to_vec(record)?);
        }
        MetadataKey::SourceUrl => {
            hasher.update(b"source_url:");
            hasher.update(record.source_url.as_bytes());
        }
    }
    Ok(format!("{:x}", hasher.finalize()))
}

impl Database {
    /// Find a stored album identical to `record`
    ///
    /// Document mode compares every field (title, URL, date, author, images); URL mode
    /// matches on the source URL only and returns the oldest row.
    pub async fn find_album(&self, record: &AlbumRecord) -> Result<Option<StoredAlbum>> {
        let row = match self.metadata_key {
            MetadataKey::Document => {
                sqlx::query_as::<_, StoredAlbum>(
                    r#"
                    SELECT
                        id, title, source_url, publish_date, author,
                        images, image_count, created_at
                    FROM albums
                    WHERE title = ?
                      AND source_url = ?
                      AND publish_date = ?
                      AND author = ?
                      AND images = ?
                    LIMIT 1
                    "#,
                )
                .bind(&record.title)
                .bind(&record.source_url)
                .bind(record.publish_date.format(DATE_FORMAT).to_string())
                .bind(&record.author)
                .bind(images_json(&record.images)?)
                .fetch_optional(&self.pool)
                .await
            }
            MetadataKey::SourceUrl => {
                sqlx::query_as::<_, StoredAlbum>(
                    r#"
                    SELECT
                        id, title, source_url, publish_date, author,
                        images, image_count, created_at
                    FROM albums
                    WHERE source_url = ?
                    ORDER BY id ASC
                    LIMIT 1
                    "#,
                )
                .bind(&record.source_url)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to find album: {}",
                e
            )))
        })?;

        Ok(row)
    }

    /// All stored records for a source URL, oldest first
    ///
    /// In document mode an album whose title or author changed upstream has one row
    /// per observed version.
    pub async fn find_albums_by_url(&self, source_url: &str) -> Result<Vec<StoredAlbum>> {
        let rows = sqlx::query_as::<_, StoredAlbum>(
            r#"
            SELECT
                id, title, source_url, publish_date, author,
                images, image_count, created_at
            FROM albums
            WHERE source_url = ?
            ORDER BY id ASC
            "#,
        )
        .bind(source_url)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to find albums by source_url: {}",
                e
            )))
        })?;

        Ok(rows)
    }
}
