//! Shared test helpers for creating DownloadCoordinator instances against a mock source.

use crate::config::{Config, RetryConfig};
use crate::db::Database;
use crate::downloader::DownloadCoordinator;
use crate::source::ReqwestFetcher;
use crate::types::AlbumDescriptor;
use chrono::NaiveDate;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A coordinator wired to a mock server, with direct access to its store
pub(crate) struct TestCoordinator {
    pub(crate) coordinator: DownloadCoordinator,
    pub(crate) db: Arc<Database>,
    pub(crate) download_dir: PathBuf,
    /// Keeps the download tree and database alive for the test's duration
    pub(crate) _temp_dir: tempfile::TempDir,
}

/// Config pointing every endpoint at `server`, with retries off
pub(crate) fn test_config(server: &MockServer, root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.source.listing_url = format!("{}/search_content/", server.uri());
    config.source.album_url_pattern = r"^http://127\.0\.0\.1:\d+/group/\d+/".to_string();
    config.download.download_dir = root.join("downloads");
    config.persistence.database_path = root.join("test.db");
    config.retry = RetryConfig::disabled();
    config
}

/// Helper to create a test coordinator with a persistent database.
pub(crate) async fn create_test_coordinator(server: &MockServer) -> TestCoordinator {
    create_test_coordinator_with(server, |_| {}).await
}

/// Same as [`create_test_coordinator`], adjusting the config first
pub(crate) async fn create_test_coordinator_with(
    server: &MockServer,
    adjust: impl FnOnce(&mut Config),
) -> TestCoordinator {
    let temp_dir = tempdir().unwrap();
    let mut config = test_config(server, temp_dir.path());
    adjust(&mut config);

    std::fs::create_dir_all(&config.download.download_dir).unwrap();

    let db = Arc::new(
        Database::new(&config.persistence.database_path)
            .await
            .unwrap()
            .with_metadata_key(config.persistence.metadata_key),
    );
    let fetcher = Arc::new(ReqwestFetcher::new(&config.source, config.retry.clone()).unwrap());
    let download_dir = config.download.download_dir.clone();

    let coordinator = DownloadCoordinator::with_parts(config, fetcher, db.clone()).unwrap();

    TestCoordinator {
        coordinator,
        db,
        download_dir,
        _temp_dir: temp_dir,
    }
}

/// Album page URL on the mock server
pub(crate) fn album_url(server: &MockServer, id: u64) -> String {
    format!("{}/group/{}/", server.uri(), id)
}

/// Descriptor for an album hosted on the mock server
pub(crate) fn descriptor(server: &MockServer, id: u64, title: &str) -> AlbumDescriptor {
    AlbumDescriptor {
        title: title.to_string(),
        source_url: album_url(server, id),
        publish_date: NaiveDate::from_ymd_opt(2018, 6, 24).unwrap(),
        author: "Photo Desk".to_string(),
    }
}

/// Page body embedding a gallery with the given image URLs
pub(crate) fn album_page(image_urls: &[String]) -> String {
    let sub_images: Vec<_> = image_urls.iter().map(|url| json!({ "url": url })).collect();
    let gallery = json!({ "count": image_urls.len(), "sub_images": sub_images }).to_string();
    let literal = serde_json::to_string(&gallery).unwrap();
    format!(
        "<html><script>var BASE_DATA = {{ gallery: JSON.parse({}), siblings: [] }};</script></html>",
        literal
    )
}

/// Mount a listing page at `offset` returning `albums`
pub(crate) async fn mount_listing(server: &MockServer, offset: u32, albums: &[AlbumDescriptor]) {
    let data: Vec<_> = albums
        .iter()
        .map(|a| {
            json!({
                "article_url": a.source_url,
                "title": a.title,
                "datetime": format!("{} 08:00:00", a.publish_date),
                "media_name": a.author,
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/search_content/"))
        .and(query_param("offset", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

/// Mount album `id` with one image per entry of `images`, returning the image URLs
///
/// Each image is served from `/img/<id>/<index>` with the given bytes.
pub(crate) async fn mount_album(server: &MockServer, id: u64, images: &[&[u8]]) -> Vec<String> {
    let urls: Vec<String> = (0..images.len())
        .map(|i| format!("{}/img/{}/{}", server.uri(), id, i))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/group/{}/", id)))
        .respond_with(ResponseTemplate::new(200).set_body_string(album_page(&urls)))
        .mount(server)
        .await;

    for (i, bytes) in images.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/img/{}/{}", id, i)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
            .mount(server)
            .await;
    }

    urls
}

/// Number of regular files directly inside `dir`
pub(crate) fn file_count(dir: &std::path::Path) -> usize {
    std::fs::read_dir(dir)
        .unwrap()
        .filter(|entry| entry.as_ref().unwrap().path().is_file())
        .count()
}
