//! Album listing, one page at a time.

use crate::config::SourceConfig;
use crate::error::{FetchError, Result};
use crate::source::HttpFetcher;
use crate::types::{AlbumDescriptor, Event, UNKNOWN_AUTHOR};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;

/// Listing API response body
#[derive(Debug, Deserialize)]
struct ListingResponse {
    #[serde(default)]
    data: Option<Vec<serde_json::Value>>,
}

/// The fields of a listing entry the lister reads; anything else is ignored
#[derive(Debug, Default, Deserialize)]
struct ListingEntry {
    #[serde(default)]
    article_url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    datetime: Option<String>,
    #[serde(default)]
    media_name: Option<String>,
}

/// Why a listing page produced no albums
#[derive(Debug, thiserror::Error)]
pub enum ListingError {
    /// The request itself failed
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The body was not the expected JSON
    #[error("malformed listing response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Queries the listing API and turns accepted entries into [`AlbumDescriptor`]s
pub struct AlbumLister {
    fetcher: Arc<dyn HttpFetcher>,
    source: SourceConfig,
    album_url: Regex,
    event_tx: Option<tokio::sync::broadcast::Sender<Event>>,
}

impl AlbumLister {
    /// Create a lister; fails if the configured album URL pattern is not a valid regex
    pub fn new(fetcher: Arc<dyn HttpFetcher>, source: SourceConfig) -> Result<Self> {
        let album_url = Regex::new(&source.album_url_pattern)?;
        Ok(Self {
            fetcher,
            source,
            album_url,
            event_tx: None,
        })
    }

    /// Report every listed or failed page on `event_tx`
    pub fn with_events(mut self, event_tx: tokio::sync::broadcast::Sender<Event>) -> Self {
        self.event_tx = Some(event_tx);
        self
    }

    /// Entries per page; offsets advance by this amount
    pub fn page_size(&self) -> u32 {
        self.source.page_size
    }

    /// Fetch one listing page and return its albums
    ///
    /// Transport or decoding failures are logged and yield an empty page so that
    /// pagination can continue with the next offset. Emits [`Event::PageListed`] or
    /// [`Event::PageFailed`] when events are attached.
    pub async fn list(&self, offset: u32) -> Vec<AlbumDescriptor> {
        match self.try_list(offset).await {
            Ok(albums) => {
                tracing::info!(offset, albums = albums.len(), "Listing page fetched");
                self.emit(Event::PageListed {
                    offset,
                    albums: albums.len(),
                });
                albums
            }
            Err(e) => {
                tracing::error!(offset, error = %e, "Failed to fetch listing page");
                self.emit(Event::PageFailed {
                    offset,
                    error: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Fetch one listing page, surfacing failures to the caller
    pub async fn try_list(
        &self,
        offset: u32,
    ) -> std::result::Result<Vec<AlbumDescriptor>, ListingError> {
        let body = self
            .fetcher
            .get_text(&self.source.listing_url, &self.query(offset))
            .await?;
        let response: ListingResponse = serde_json::from_str(&body)?;

        let entries = response.data.unwrap_or_default();
        let total = entries.len();
        let mut seen = HashSet::new();
        let albums: Vec<AlbumDescriptor> = entries
            .into_iter()
            .filter_map(|value| self.accept(value))
            .filter(|album| seen.insert(album.source_url.clone()))
            .collect();

        tracing::debug!(
            offset,
            entries = total,
            accepted = albums.len(),
            "Listing page filtered"
        );

        Ok(albums)
    }

    fn emit(&self, event: Event) {
        if let Some(tx) = &self.event_tx {
            tx.send(event).ok();
        }
    }

    /// Fixed query shape for a listing request
    fn query(&self, offset: u32) -> Vec<(&'static str, String)> {
        vec![
            ("offset", offset.to_string()),
            ("format", "json".to_string()),
            ("keyword", self.source.keyword.clone()),
            ("autoload", "true".to_string()),
            ("count", self.source.page_size.to_string()),
            ("cur_tab", self.source.gallery_tab.to_string()),
            ("from", "search_tab".to_string()),
        ]
    }

    /// Map one raw entry to a descriptor, or `None` if it is not a well-formed album
    fn accept(&self, value: serde_json::Value) -> Option<AlbumDescriptor> {
        let entry: ListingEntry = serde_json::from_value(value).ok()?;

        let source_url = entry.article_url.filter(|url| self.album_url.is_match(url))?;

        let Some(publish_date) = entry.datetime.as_deref().and_then(parse_publish_date) else {
            tracing::debug!(album_url = %source_url, "Dropping entry without a parseable datetime");
            return None;
        };

        Some(AlbumDescriptor {
            title: entry.title.unwrap_or_default(),
            source_url,
            publish_date,
            author: entry
                .media_name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string()),
        })
    }
}

/// Date part of a listing `datetime` such as `"2018-06-24 10:31:02"`
fn parse_publish_date(datetime: &str) -> Option<NaiveDate> {
    let date = datetime.split_whitespace().next()?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::source::ReqwestFetcher;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn lister_for(mock_server: &MockServer) -> AlbumLister {
        let source = SourceConfig {
            listing_url: format!("{}/search_content/", mock_server.uri()),
            album_url_pattern: r"^http://toutiao\.com/group/\d+/".to_string(),
            ..Default::default()
        };
        let fetcher = ReqwestFetcher::new(&source, RetryConfig::disabled()).unwrap();
        AlbumLister::new(Arc::new(fetcher), source).unwrap()
    }

    fn album_entry(id: u64) -> serde_json::Value {
        json!({
            "article_url": format!("http://toutiao.com/group/{}/", id),
            "title": format!("Album {}", id),
            "datetime": "2018-06-24 10:31:02",
            "media_name": "Photo Desk",
        })
    }

    #[test]
    fn test_parse_publish_date() {
        assert_eq!(
            parse_publish_date("2018-06-24 10:31:02"),
            NaiveDate::from_ymd_opt(2018, 6, 24)
        );
        assert_eq!(
            parse_publish_date("2018-06-24"),
            NaiveDate::from_ymd_opt(2018, 6, 24)
        );
        assert_eq!(parse_publish_date("yesterday"), None);
        assert_eq!(parse_publish_date(""), None);
    }

    #[tokio::test]
    async fn test_list_sends_fixed_query_shape() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .and(query_param("offset", "20"))
            .and(query_param("format", "json"))
            .and(query_param("keyword", "街拍"))
            .and(query_param("autoload", "true"))
            .and(query_param("count", "20"))
            .and(query_param("cur_tab", "3"))
            .and(query_param("from", "search_tab"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [album_entry(1)] })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let albums = lister_for(&mock_server).list(20).await;
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].title, "Album 1");
        assert_eq!(albums[0].author, "Photo Desk");
        assert_eq!(albums[0].publish_date, NaiveDate::from_ymd_opt(2018, 6, 24).unwrap());
    }

    #[tokio::test]
    async fn test_list_filters_non_album_entries() {
        let mut data: Vec<serde_json::Value> = (1..=15).map(album_entry).collect();
        // Article links, missing URLs and junk entries
        data.push(json!({ "article_url": "http://toutiao.com/item/99/", "title": "article", "datetime": "2018-06-24 00:00:00" }));
        data.push(json!({ "article_url": "https://www.toutiao.com/a6570000/", "title": "article", "datetime": "2018-06-24 00:00:00" }));
        data.push(json!({ "title": "no url", "datetime": "2018-06-24 00:00:00" }));
        data.push(json!({ "article_url": null, "title": "null url" }));
        data.push(json!("not an object"));

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
            .mount(&mock_server)
            .await;

        let albums = lister_for(&mock_server).list(0).await;
        assert_eq!(albums.len(), 15);
        assert!(albums.iter().all(|a| a.source_url.starts_with("http://toutiao.com/group/")));
    }

    #[tokio::test]
    async fn test_list_defaults_missing_author() {
        let mut entry = album_entry(7);
        entry.as_object_mut().unwrap().remove("media_name");

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [entry] })))
            .mount(&mock_server)
            .await;

        let albums = lister_for(&mock_server).list(0).await;
        assert_eq!(albums[0].author, UNKNOWN_AUTHOR);
    }

    #[tokio::test]
    async fn test_list_drops_duplicate_urls_within_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [album_entry(1), album_entry(2), album_entry(1)]
            })))
            .mount(&mock_server)
            .await;

        let albums = lister_for(&mock_server).list(0).await;
        let urls: Vec<&str> = albums.iter().map(|a| a.source_url.as_str()).collect();
        assert_eq!(urls, vec!["http://toutiao.com/group/1/", "http://toutiao.com/group/2/"]);
    }

    #[tokio::test]
    async fn test_list_http_error_yields_empty_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let lister = lister_for(&mock_server);
        assert!(lister.list(0).await.is_empty());
        assert!(matches!(
            lister.try_list(0).await,
            Err(ListingError::Fetch(FetchError::Status { status: 500, .. }))
        ));
    }

    #[tokio::test]
    async fn test_list_malformed_body_yields_empty_page() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
            .mount(&mock_server)
            .await;

        let lister = lister_for(&mock_server);
        assert!(lister.list(0).await.is_empty());
        assert!(matches!(lister.try_list(0).await, Err(ListingError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_list_reports_page_events() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [album_entry(1), album_entry(2)]
            })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .and(query_param("offset", "20"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let (tx, mut rx) = tokio::sync::broadcast::channel(16);
        let lister = lister_for(&mock_server).with_events(tx);
        assert_eq!(lister.list(0).await.len(), 2);
        assert!(lister.list(20).await.is_empty());

        assert!(matches!(
            rx.try_recv().unwrap(),
            Event::PageListed { offset: 0, albums: 2 }
        ));
        match rx.try_recv().unwrap() {
            Event::PageFailed { offset, error } => {
                assert_eq!(offset, 20);
                assert!(error.contains("503"), "{}", error);
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_missing_data_is_empty_not_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search_content/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "has_more": 0 })))
            .mount(&mock_server)
            .await;

        let albums = lister_for(&mock_server).try_list(0).await.unwrap();
        assert!(albums.is_empty());
    }
}
