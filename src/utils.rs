//! Utility functions for file naming and directory layout

use crate::error::{Error, Result};
use crate::types::AlbumRecord;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// Characters that are not allowed in album directory names on common filesystems
const ILLEGAL_TITLE_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Replace every filesystem-illegal character in a title with `_`
///
/// # Examples
///
/// ```
/// use album_dl::utils::sanitize_title;
///
/// assert_eq!(sanitize_title("a/b: c?"), "a_b_ c_");
/// ```
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| if ILLEGAL_TITLE_CHARS.contains(&c) { '_' } else { c })
        .collect()
}

/// Directory name for an album: `[<N>P] <sanitized title>`
pub fn album_dir_name(image_count: usize, title: &str) -> String {
    format!("[{}P] {}", image_count, sanitize_title(title))
}

/// Date partition directory under the base download directory
pub fn date_dir(base: &Path, date: NaiveDate) -> PathBuf {
    base.join(date.format("%Y-%m-%d").to_string())
}

/// Full directory for an album record: `<base>/<YYYY-MM-DD>/[<N>P] <title>`
pub fn album_dir(base: &Path, record: &AlbumRecord) -> PathBuf {
    date_dir(base, record.publish_date).join(album_dir_name(record.image_count(), &record.title))
}

/// Lowercase hex MD5 digest of image bytes, used as the on-disk file stem
pub fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", md5::compute(bytes))
}

/// Content-addressed file name for image bytes
pub fn image_file_name(bytes: &[u8], extension: &str) -> String {
    format!("{}.{}", content_hash(bytes), extension)
}

/// Create a directory (and parents) if missing; an existing directory is not an error
///
/// Returns `true` if the directory did not exist before the call.
pub async fn ensure_dir(path: &Path) -> Result<bool> {
    if tokio::fs::try_exists(path)
        .await
        .map_err(|e| Error::fs(path, e))?
    {
        return Ok(false);
    }
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| Error::fs(path, e))?;
    Ok(true)
}

/// Count regular files directly inside `dir` (no recursion, directories and symlinks to
/// directories excluded)
pub async fn count_regular_files(dir: &Path) -> Result<usize> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::fs(dir, e))?;
    let mut count = 0;
    while let Some(entry) = entries.next_entry().await.map_err(|e| Error::fs(dir, e))? {
        // Follow symlinks the same way a plain `is_file` check would
        let is_file = tokio::fs::metadata(entry.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if is_file {
            count += 1;
        }
    }
    Ok(count)
}
