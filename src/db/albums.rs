//! Album record insert and listing.

use crate::error::{DatabaseError, Error, Result};
use crate::types::AlbumRecord;

use super::duplicates::{dedup_key, images_json};
use super::{DATE_FORMAT, Database, InsertOutcome, StoredAlbum};

impl Database {
    /// Insert an album record unless one with the same identity already exists
    ///
    /// The existence check and the write are a single `INSERT OR IGNORE` against the
    /// unique `dedup_key`, so concurrent workers storing the same album produce one row.
    pub async fn insert_album_if_absent(&self, record: &AlbumRecord) -> Result<InsertOutcome> {
        let now = chrono::Utc::now().timestamp();
        let key = dedup_key(record, self.metadata_key)?;

        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO albums (
                dedup_key, title, source_url, publish_date, author,
                images, image_count, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&key)
        .bind(&record.title)
        .bind(&record.source_url)
        .bind(record.publish_date.format(DATE_FORMAT).to_string())
        .bind(&record.author)
        .bind(images_json(&record.images)?)
        .bind(record.image_count() as i64)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::InsertFailed(format!(
                "Failed to insert album '{}': {}",
                record.source_url, e
            )))
        })?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted(result.last_insert_rowid()))
        }
    }

    /// List all stored albums, oldest first
    pub async fn list_albums(&self) -> Result<Vec<StoredAlbum>> {
        let rows = sqlx::query_as::<_, StoredAlbum>(
            r#"
            SELECT
                id, title, source_url, publish_date, author,
                images, image_count, created_at
            FROM albums
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to list albums: {}",
                e
            )))
        })?;

        Ok(rows)
    }

    /// Number of stored album records
    pub async fn count_albums(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM albums")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to count albums: {}",
                    e
                )))
            })?;

        Ok(count)
    }
}
