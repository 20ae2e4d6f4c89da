//! On-disk and event assertions for integration tests

use album_dl::Event;
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;
use walkdir::WalkDir;

/// All regular files under `root`, sorted, skipping the staging directory
pub fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != ".partial")
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Album directories (second level below the download root), sorted
pub fn album_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = WalkDir::new(root)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.into_path())
        .collect();
    dirs.sort();
    dirs
}

/// Drain every event already sent to `events`
pub fn drain_events(events: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    received
}
