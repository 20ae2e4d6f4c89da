//! [`MetadataStore`], the lookup and insert seam the pipeline persists through.

use crate::error::Result;
use crate::types::AlbumRecord;
use async_trait::async_trait;

use super::{Database, InsertOutcome, StoredAlbum};

/// Document store holding one record per album identity
///
/// The pipeline only needs a lookup and an insert; [`Database`] is the production
/// implementation, tests may provide their own.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Look up a stored record with the same identity as `record`
    async fn find_one(&self, record: &AlbumRecord) -> Result<Option<StoredAlbum>>;

    /// Store `record` unless a record with the same identity exists
    async fn insert_one(&self, record: &AlbumRecord) -> Result<InsertOutcome>;
}

#[async_trait]
impl MetadataStore for Database {
    async fn find_one(&self, record: &AlbumRecord) -> Result<Option<StoredAlbum>> {
        self.find_album(record).await
    }

    async fn insert_one(&self, record: &AlbumRecord) -> Result<InsertOutcome> {
        self.insert_album_if_absent(record).await
    }
}
