//! Skip decisions that make repeated runs safe and cheap.
//!
//! Three independent layers, each consulted at a different point of an album's
//! processing:
//!
//! 1. **Metadata**: a record with the same identity is already stored, so the insert
//!    is skipped ([`IdempotencyGate::persist_if_new`]).
//! 2. **Directory completeness**: the album directory already holds as many regular
//!    files as the album has images, so no image is fetched
//!    ([`IdempotencyGate::is_album_complete`]).
//! 3. **Content**: fetched bytes hash to a file name that already exists, so nothing
//!    is written ([`IdempotencyGate::write_if_absent`]).

use crate::db::{InsertOutcome, MetadataStore};
use crate::error::{Error, Result};
use crate::types::AlbumRecord;
use crate::utils::{album_dir, count_regular_files, date_dir, ensure_dir, image_file_name};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of the metadata check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataDecision {
    /// The record was new and has been stored under this row id
    Stored(i64),
    /// An identical record already existed; nothing was written
    AlreadyStored,
}

/// Result of the content check for one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageWrite {
    /// The bytes were written to this path
    Written(PathBuf),
    /// A file with the same content hash already existed at this path
    AlreadyPresent(PathBuf),
}

impl ImageWrite {
    /// Final path of the image, whether or not it was written by this call
    pub fn path(&self) -> &Path {
        match self {
            ImageWrite::Written(path) | ImageWrite::AlreadyPresent(path) => path,
        }
    }
}

/// Idempotency checks shared by every album worker
#[derive(Clone)]
pub struct IdempotencyGate {
    store: Arc<dyn MetadataStore>,
    base_dir: PathBuf,
    staging_dir: PathBuf,
    extension: String,
}

impl IdempotencyGate {
    /// Create a gate over a metadata store and a download tree
    ///
    /// Images are staged in `staging_dir` before being renamed into their album
    /// directory; it should live on the same filesystem as `base_dir`.
    pub fn new(
        store: Arc<dyn MetadataStore>,
        base_dir: impl Into<PathBuf>,
        staging_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Self {
        Self {
            store,
            base_dir: base_dir.into(),
            staging_dir: staging_dir.into(),
            extension: extension.into(),
        }
    }

    /// Base download directory
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Store `record` unless an identical one exists
    ///
    /// The lookup avoids a write in the common case; the insert itself is atomic, so
    /// two workers racing on the same album still produce one record.
    pub async fn persist_if_new(&self, record: &AlbumRecord) -> Result<MetadataDecision> {
        if self.store.find_one(record).await?.is_some() {
            return Ok(MetadataDecision::AlreadyStored);
        }

        match self.store.insert_one(record).await? {
            InsertOutcome::Inserted(id) => Ok(MetadataDecision::Stored(id)),
            InsertOutcome::AlreadyExists => Ok(MetadataDecision::AlreadyStored),
        }
    }

    /// Ensure the date partition and album directories exist and return the album directory
    pub async fn prepare_album_dir(&self, record: &AlbumRecord) -> Result<PathBuf> {
        let date = date_dir(&self.base_dir, record.publish_date);
        if ensure_dir(&date).await? {
            tracing::debug!(dir = %date.display(), "Created date directory");
        }

        let dir = album_dir(&self.base_dir, record);
        if ensure_dir(&dir).await? {
            tracing::debug!(dir = %dir.display(), "Created album directory");
        }

        Ok(dir)
    }

    /// Whether `dir` already holds exactly `expected` regular files
    pub async fn is_album_complete(&self, dir: &Path, expected: usize) -> Result<bool> {
        Ok(count_regular_files(dir).await? == expected)
    }

    /// Write image bytes to `<dir>/<md5>.<ext>` unless that file already exists
    ///
    /// Bytes are written to the staging directory first and renamed into place, so
    /// an interrupted write never leaves a partial file in the album directory.
    pub async fn write_if_absent(&self, dir: &Path, bytes: &[u8]) -> Result<ImageWrite> {
        let file_name = image_file_name(bytes, &self.extension);
        let target = dir.join(&file_name);

        if exists(&target).await? {
            return Ok(ImageWrite::AlreadyPresent(target));
        }

        ensure_dir(&self.staging_dir).await?;
        let staged = self
            .staging_dir
            .join(format!("{}.{:016x}.part", file_name, rand::random::<u64>()));
        tokio::fs::write(&staged, bytes)
            .await
            .map_err(|e| Error::fs(&staged, e))?;

        // Another worker may have finished the same content while this one was writing
        if exists(&target).await? {
            discard(&staged).await;
            return Ok(ImageWrite::AlreadyPresent(target));
        }

        if let Err(e) = tokio::fs::rename(&staged, &target).await {
            // Staging on another filesystem cannot be renamed across; copy instead
            tracing::debug!(error = %e, staged = %staged.display(), "Rename failed, copying staged image");
            let copied = tokio::fs::copy(&staged, &target).await;
            discard(&staged).await;
            copied.map_err(|e| Error::fs(&target, e))?;
        }

        Ok(ImageWrite::Written(target))
    }
}

async fn exists(path: &Path) -> Result<bool> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| Error::fs(path, e))
}

async fn discard(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(path = %path.display(), error = %e, "Failed to remove staged image");
    }
}
