//! Test configuration helpers pointing a coordinator at a mock source

use album_dl::config::RetryConfig;
use album_dl::{Config, DownloadCoordinator};
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::MockServer;

/// Album links served by the mock server look like `http://127.0.0.1:<port>/group/<id>/`
pub const MOCK_ALBUM_PATTERN: &str = r"^http://127\.0\.0\.1:\d+/group/\d+/";

/// Config with every endpoint on `server` and all state under `root`
///
/// Retries are disabled so request counts in `.expect(n)` are exact.
pub fn mock_config(server: &MockServer, root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.source.listing_url = format!("{}/search_content/", server.uri());
    config.source.album_url_pattern = MOCK_ALBUM_PATTERN.to_string();
    config.download.download_dir = root.join("downloads");
    config.persistence.database_path = root.join("metadata.db");
    config.retry = RetryConfig::disabled();
    config
}

/// A fully initialized coordinator and the directory holding its state
pub struct TestRun {
    pub coordinator: DownloadCoordinator,
    pub download_dir: PathBuf,
    pub database_path: PathBuf,
    pub temp_dir: TempDir,
}

/// Build a coordinator through the public constructor, as the binary does
pub async fn create_coordinator(server: &MockServer) -> TestRun {
    let temp_dir = tempfile::tempdir().unwrap();
    create_coordinator_in(server, temp_dir).await
}

/// Build a coordinator over an existing state directory (for repeated runs)
pub async fn create_coordinator_in(server: &MockServer, temp_dir: TempDir) -> TestRun {
    let config = mock_config(server, temp_dir.path());
    let download_dir = config.download.download_dir.clone();
    let database_path = config.persistence.database_path.clone();

    let coordinator = DownloadCoordinator::new(config).await.unwrap();

    TestRun {
        coordinator,
        download_dir,
        database_path,
        temp_dir,
    }
}
