//! Album download pipeline split into focused submodules.
//!
//! The [`DownloadCoordinator`] owns every shared component and is organized by domain:
//! - [`album`] - Per-album processing: page fetch, extraction, idempotency checks, image loop
//! - [`run`] - Pagination and bounded per-page fan-out

mod album;
mod run;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use album::AlbumDownloader;

use crate::config::Config;
use crate::db::{Database, MetadataStore};
use crate::error::{Error, Result};
use crate::gate::IdempotencyGate;
use crate::source::{AlbumLister, HttpFetcher, ReqwestFetcher};
use std::sync::Arc;

/// Drives a whole run: lists pages and dispatches albums to workers
///
/// Cloneable; all shared state is Arc-wrapped.
#[derive(Clone)]
pub struct DownloadCoordinator {
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<crate::types::Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Listing API client
    pub(crate) lister: Arc<AlbumLister>,
    /// Per-album worker, cloned into every spawned task
    pub(crate) downloader: AlbumDownloader,
}

impl DownloadCoordinator {
    /// Create a coordinator from configuration
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the download and staging directories
    /// - Opens/creates the SQLite metadata store and runs migrations
    /// - Builds the shared HTTP client
    ///
    /// Any failure here is fatal; once running, failures are isolated per page,
    /// album and image.
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let download_dir = &config.download.download_dir;
        tokio::fs::create_dir_all(download_dir)
            .await
            .map_err(|e| Error::fs(download_dir, e))?;
        let staging_dir = config.download.staging_dir();
        tokio::fs::create_dir_all(&staging_dir)
            .await
            .map_err(|e| Error::fs(&staging_dir, e))?;

        let db = Database::new(&config.persistence.database_path)
            .await?
            .with_metadata_key(config.persistence.metadata_key);
        tracing::info!(
            database = %config.persistence.database_path.display(),
            metadata_key = ?config.persistence.metadata_key,
            "Metadata store opened"
        );

        let fetcher = ReqwestFetcher::new(&config.source, config.retry.clone())?;

        Self::with_parts(config, Arc::new(fetcher), Arc::new(db))
    }

    /// Create a coordinator from explicit collaborators
    ///
    /// Nothing is created on disk; the download directory is expected to exist.
    pub fn with_parts(
        config: Config,
        fetcher: Arc<dyn HttpFetcher>,
        store: Arc<dyn MetadataStore>,
    ) -> Result<Self> {
        // Buffer of 1000 events; slow subscribers see RecvError::Lagged
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let lister =
            AlbumLister::new(fetcher.clone(), config.source.clone())?.with_events(event_tx.clone());
        let gate = IdempotencyGate::new(
            store,
            config.download.download_dir.clone(),
            config.download.staging_dir(),
            config.download.image_extension.clone(),
        );
        let downloader = AlbumDownloader::new(
            fetcher,
            gate,
            config.download.image_concurrency,
            event_tx.clone(),
        )?;

        Ok(Self {
            event_tx,
            config: Arc::new(config),
            lister: Arc::new(lister),
            downloader,
        })
    }

    /// Subscribe to run events
    ///
    /// Multiple subscribers are supported. Each subscriber receives all events independently.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use album_dl::{Config, DownloadCoordinator};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let coordinator = DownloadCoordinator::new(Config::default()).await?;
    ///
    ///     let mut events = coordinator.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{:?}", event);
    ///         }
    ///     });
    ///
    ///     coordinator.run(3, 10).await;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<crate::types::Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }
}
