//! # album-dl
//!
//! Album discovery and idempotent image downloader.
//!
//! ## Design Philosophy
//!
//! album-dl is designed to be:
//! - **Safe to re-run** - Metadata, directories and image files are all deduplicated
//! - **Sensible defaults** - Works out of the box with zero configuration
//! - **Failure-isolated** - A bad page, album or image never stops the run
//! - **Event-driven** - Consumers subscribe to events, no polling required
//!
//! ## Quick Start
//!
//! ```no_run
//! use album_dl::{Config, DownloadCoordinator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.download.download_dir = "./albums".into();
//!
//!     let coordinator = DownloadCoordinator::new(config).await?;
//!
//!     // Subscribe to events
//!     let mut events = coordinator.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let summary = coordinator.run_with_summary(3, 10).await;
//!     println!("{} albums seen", summary.albums_seen);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Metadata store
pub mod db;
/// Pagination, per-album workers and the run coordinator
pub mod downloader;
/// Error types
pub mod error;
/// Idempotency checks (metadata, directory completeness, content hash)
pub mod gate;
/// Retry logic with exponential backoff
pub mod retry;
/// Remote source access: HTTP, listing pages, gallery extraction
pub mod source;
/// Core types and events
pub mod types;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use config::{Config, MetadataKey};
pub use db::{Database, MetadataStore};
pub use downloader::{AlbumDownloader, DownloadCoordinator};
pub use error::{DatabaseError, Error, FetchError, Result};
pub use gate::IdempotencyGate;
pub use source::{AlbumLister, HttpFetcher, ImageUrlExtractor, ReqwestFetcher};
pub use types::{AlbumDescriptor, AlbumOutcome, AlbumRecord, Event, ImageTally, RunSummary};

/// Run the coordinator until it finishes or a termination signal arrives.
///
/// Returns `None` if the run was interrupted. Albums in flight at that point are
/// abandoned; a later run picks them up through the idempotency checks.
///
/// - **Unix:** listens for SIGTERM and Ctrl+C.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use album_dl::{Config, DownloadCoordinator, run_until_signal};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let coordinator = DownloadCoordinator::new(Config::default()).await?;
///
///     if let Some(summary) = run_until_signal(&coordinator, 3, 10).await {
///         println!("{:?}", summary);
///     }
///
///     Ok(())
/// }
/// ```
pub async fn run_until_signal(
    coordinator: &DownloadCoordinator,
    page_count: u32,
    workers: usize,
) -> Option<RunSummary> {
    tokio::select! {
        summary = coordinator.run_with_summary(page_count, workers) => Some(summary),
        _ = wait_for_signal() => {
            tracing::warn!("Run interrupted before completion");
            None
        }
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for Ctrl+C only");
            tokio::signal::ctrl_c().await.ok();
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
