//! Per-album processing.

use crate::error::Result;
use crate::gate::{IdempotencyGate, ImageWrite, MetadataDecision};
use crate::source::{HttpFetcher, ImageUrlExtractor};
use crate::types::{AlbumDescriptor, AlbumOutcome, AlbumRecord, Event, ImageTally};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;

/// How a single image ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ImageStatus {
    Saved,
    Existing,
    Failed,
}

/// Downloads one album: page, gallery, metadata, directory, images
#[derive(Clone)]
pub struct AlbumDownloader {
    fetcher: Arc<dyn HttpFetcher>,
    extractor: ImageUrlExtractor,
    gate: IdempotencyGate,
    image_concurrency: usize,
    event_tx: tokio::sync::broadcast::Sender<Event>,
}

impl AlbumDownloader {
    /// Create an album downloader
    ///
    /// `image_concurrency` bounds the number of in-flight image fetches within one
    /// album; 1 fetches images one after another.
    pub fn new(
        fetcher: Arc<dyn HttpFetcher>,
        gate: IdempotencyGate,
        image_concurrency: usize,
        event_tx: tokio::sync::broadcast::Sender<Event>,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor: ImageUrlExtractor::new()?,
            gate,
            image_concurrency: image_concurrency.max(1),
            event_tx,
        })
    }

    /// Process one album; never fails
    ///
    /// Anything that stops the album (page fetch, directory creation) is logged and
    /// reported as [`AlbumOutcome::Failed`]; failures of single images are counted in
    /// the returned tally.
    pub async fn process(&self, album: AlbumDescriptor) -> AlbumOutcome {
        let url = album.source_url.clone();
        match self.process_album(album).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(album_url = %url, error = %e, "Album processing failed");
                self.emit(Event::AlbumFailed {
                    url,
                    error: e.to_string(),
                });
                AlbumOutcome::Failed(e.to_string())
            }
        }
    }

    async fn process_album(&self, album: AlbumDescriptor) -> Result<AlbumOutcome> {
        let body = self.fetcher.get_text(&album.source_url, &[]).await?;

        let Some(images) = self.extractor.extract_with_base(&body, &album.source_url) else {
            tracing::debug!(album_url = %album.source_url, "No gallery found on album page");
            self.emit(Event::AlbumNoImages {
                url: album.source_url,
            });
            return Ok(AlbumOutcome::NoImages);
        };

        let record = album.into_record(images);
        self.persist(&record).await;

        let dir = self.gate.prepare_album_dir(&record).await?;

        if self
            .gate
            .is_album_complete(&dir, record.image_count())
            .await?
        {
            tracing::info!(
                album_url = %record.source_url,
                dir = %dir.display(),
                images = record.image_count(),
                "Album already downloaded"
            );
            self.emit(Event::AlbumComplete {
                url: record.source_url,
                dir,
            });
            return Ok(AlbumOutcome::AlreadyComplete);
        }

        let tally = self.download_images(&record, &dir).await;

        tracing::info!(
            album_url = %record.source_url,
            saved = tally.saved,
            existing = tally.existing,
            failed = tally.failed,
            "Album finished"
        );
        self.emit(Event::AlbumFinished {
            url: record.source_url.clone(),
            saved: tally.saved,
            existing: tally.existing,
            failed: tally.failed,
        });

        Ok(AlbumOutcome::Downloaded(tally))
    }

    /// Metadata check; a store failure is logged and the download goes ahead
    async fn persist(&self, record: &AlbumRecord) {
        match self.gate.persist_if_new(record).await {
            Ok(MetadataDecision::Stored(id)) => {
                tracing::info!(
                    album_url = %record.source_url,
                    record_id = id,
                    images = record.image_count(),
                    "Album metadata stored"
                );
                self.emit(Event::AlbumStored {
                    url: record.source_url.clone(),
                    images: record.image_count(),
                });
            }
            Ok(MetadataDecision::AlreadyStored) => {
                tracing::debug!(album_url = %record.source_url, "Album metadata already stored");
                self.emit(Event::AlbumAlreadyStored {
                    url: record.source_url.clone(),
                });
            }
            Err(e) => {
                tracing::error!(album_url = %record.source_url, error = %e, "Failed to store album metadata");
            }
        }
    }

    async fn download_images(&self, record: &AlbumRecord, dir: &Path) -> ImageTally {
        // Owned URLs keep the stream future Send for spawned album workers
        let statuses: Vec<ImageStatus> = futures::stream::iter(record.images.clone())
            .map(|url| async move { self.download_image(&url, dir).await })
            .buffer_unordered(self.image_concurrency)
            .collect()
            .await;

        let mut tally = ImageTally::default();
        for status in statuses {
            match status {
                ImageStatus::Saved => tally.saved += 1,
                ImageStatus::Existing => tally.existing += 1,
                ImageStatus::Failed => tally.failed += 1,
            }
        }
        tally
    }

    /// Fetch and store one image; failures stay with this image
    async fn download_image(&self, url: &str, dir: &Path) -> ImageStatus {
        let bytes = match self.fetcher.get_bytes(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::error!(image_url = %url, error = %e, "Failed to fetch image");
                self.emit(Event::ImageFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                return ImageStatus::Failed;
            }
        };

        match self.gate.write_if_absent(dir, &bytes).await {
            Ok(ImageWrite::Written(path)) => {
                tracing::debug!(image_url = %url, path = %path.display(), "Image saved");
                self.emit(Event::ImageSaved {
                    url: url.to_string(),
                    path,
                });
                ImageStatus::Saved
            }
            Ok(ImageWrite::AlreadyPresent(path)) => {
                tracing::debug!(image_url = %url, path = %path.display(), "Image already on disk");
                self.emit(Event::ImageExists {
                    url: url.to_string(),
                    path,
                });
                ImageStatus::Existing
            }
            Err(e) => {
                tracing::error!(image_url = %url, error = %e, "Failed to write image");
                self.emit(Event::ImageFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                ImageStatus::Failed
            }
        }
    }

    fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
