//! Core types and events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Author recorded when a listing entry carries no `media_name`
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// One album as discovered on a listing page
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlbumDescriptor {
    /// Album title as published
    pub title: String,
    /// Canonical album page URL (natural key)
    pub source_url: String,
    /// Publication date, used to partition the download directory
    pub publish_date: NaiveDate,
    /// Publisher name, [`UNKNOWN_AUTHOR`] when absent
    pub author: String,
}

impl AlbumDescriptor {
    /// Enrich the descriptor with its extracted image URLs
    pub fn into_record(self, images: Vec<String>) -> AlbumRecord {
        AlbumRecord {
            title: self.title,
            source_url: self.source_url,
            publish_date: self.publish_date,
            author: self.author,
            images,
        }
    }
}

/// An album together with its ordered image URLs; the unit of metadata persistence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    /// Album title as published
    pub title: String,
    /// Canonical album page URL
    pub source_url: String,
    /// Publication date
    pub publish_date: NaiveDate,
    /// Publisher name
    pub author: String,
    /// Image URLs in document order
    pub images: Vec<String>,
}

impl AlbumRecord {
    /// Number of images the album declares
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}

/// Event emitted while a run progresses
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A listing page was fetched and filtered
    PageListed {
        /// Page offset in entries
        offset: u32,
        /// Albums accepted on this page
        albums: usize,
    },

    /// A listing page could not be fetched; it counts as empty
    PageFailed {
        /// Page offset in entries
        offset: u32,
        /// Error message
        error: String,
    },

    /// The album page carried no gallery data
    AlbumNoImages {
        /// Album page URL
        url: String,
    },

    /// A new metadata record was stored
    AlbumStored {
        /// Album page URL
        url: String,
        /// Number of images in the record
        images: usize,
    },

    /// An identical metadata record already existed
    AlbumAlreadyStored {
        /// Album page URL
        url: String,
    },

    /// The album directory already holds every image; no fetches performed
    AlbumComplete {
        /// Album page URL
        url: String,
        /// Album directory
        dir: PathBuf,
    },

    /// An image was written to disk
    ImageSaved {
        /// Image URL
        url: String,
        /// Content-addressed file path
        path: PathBuf,
    },

    /// An image's bytes were already on disk under their hash name
    ImageExists {
        /// Image URL
        url: String,
        /// Existing file path
        path: PathBuf,
    },

    /// A single image could not be fetched or written
    ImageFailed {
        /// Image URL
        url: String,
        /// Error message
        error: String,
    },

    /// The image loop for an album finished
    AlbumFinished {
        /// Album page URL
        url: String,
        /// Images newly written
        saved: usize,
        /// Images already present
        existing: usize,
        /// Images that failed
        failed: usize,
    },

    /// The album could not be processed at all
    AlbumFailed {
        /// Album page URL
        url: String,
        /// Error message
        error: String,
    },
}

/// Per-image tallies for one album's fetch loop
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageTally {
    /// Images newly written
    pub saved: usize,
    /// Images whose content was already on disk
    pub existing: usize,
    /// Images that failed to fetch or write
    pub failed: usize,
}

/// How processing a single album ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlbumOutcome {
    /// The page had no embedded gallery
    NoImages,
    /// The album directory already held every image
    AlreadyComplete,
    /// The image loop ran
    Downloaded(ImageTally),
    /// Processing aborted before or during the album (page fetch, directories)
    Failed(String),
}

/// Totals for a whole run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Album descriptors returned by the lister across all pages
    pub albums_seen: usize,
    /// Albums whose image loop ran
    pub albums_downloaded: usize,
    /// Albums skipped by the directory-completeness check
    pub albums_complete: usize,
    /// Albums without an embedded gallery
    pub albums_without_images: usize,
    /// Albums that failed before the image loop
    pub albums_failed: usize,
    /// Image tallies summed over all albums
    pub images: ImageTally,
}

impl RunSummary {
    /// Fold one album's outcome into the totals
    pub fn record(&mut self, outcome: &AlbumOutcome) {
        match outcome {
            AlbumOutcome::NoImages => self.albums_without_images += 1,
            AlbumOutcome::AlreadyComplete => self.albums_complete += 1,
            AlbumOutcome::Downloaded(tally) => {
                self.albums_downloaded += 1;
                self.images.saved += tally.saved;
                self.images.existing += tally.existing;
                self.images.failed += tally.failed;
            }
            AlbumOutcome::Failed(_) => self.albums_failed += 1,
        }
    }
}
