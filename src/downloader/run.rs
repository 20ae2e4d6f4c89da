//! Pagination and bounded fan-out of albums to workers.

use crate::types::{AlbumDescriptor, AlbumOutcome, RunSummary};
use std::sync::Arc;

use super::DownloadCoordinator;

impl DownloadCoordinator {
    /// Process `page_count` listing pages with at most `workers` albums in flight
    ///
    /// Returns the number of album descriptors seen across all pages.
    pub async fn run(&self, page_count: u32, workers: usize) -> usize {
        self.run_with_summary(page_count, workers).await.albums_seen
    }

    /// Like [`run`](Self::run), returning per-album and per-image totals
    ///
    /// Pages run one after another at offsets `0, page_size, 2 * page_size, ...`;
    /// every album of a page finishes before the next page is requested.
    pub async fn run_with_summary(&self, page_count: u32, workers: usize) -> RunSummary {
        let workers = workers.max(1);
        let page_size = self.lister.page_size();
        let mut summary = RunSummary::default();

        for page in 0..page_count {
            let offset = page.saturating_mul(page_size);
            let albums = self.lister.list(offset).await;
            summary.albums_seen += albums.len();

            for outcome in self.process_page(albums, workers).await {
                summary.record(&outcome);
            }
        }

        tracing::info!(
            albums_seen = summary.albums_seen,
            albums_downloaded = summary.albums_downloaded,
            albums_complete = summary.albums_complete,
            albums_without_images = summary.albums_without_images,
            albums_failed = summary.albums_failed,
            images_saved = summary.images.saved,
            images_existing = summary.images.existing,
            images_failed = summary.images.failed,
            "Run finished"
        );

        summary
    }

    /// Run every album of one page, bounded by a semaphore, and wait for all of them
    async fn process_page(&self, albums: Vec<AlbumDescriptor>, workers: usize) -> Vec<AlbumOutcome> {
        let concurrent_limit = Arc::new(tokio::sync::Semaphore::new(workers));
        let mut handles = Vec::with_capacity(albums.len());

        for album in albums {
            let permit = match concurrent_limit.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    tracing::error!(error = %e, "Worker semaphore closed");
                    break;
                }
            };
            let downloader = self.downloader.clone();
            handles.push(tokio::spawn(async move {
                let _permit = permit;
                downloader.process(album).await
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::error!(error = %e, "Album worker panicked");
                    outcomes.push(AlbumOutcome::Failed(e.to_string()));
                }
            }
        }
        outcomes
    }
}
