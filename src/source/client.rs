//! HTTP fetching behind the [`HttpFetcher`] seam.

use crate::config::{RetryConfig, SourceConfig};
use crate::error::{Error, FetchError, Result};
use crate::retry::fetch_with_retry;
use async_trait::async_trait;

/// Abstraction over HTTP GETs, enabling testability.
///
/// Every call resolves to its payload or a classified [`FetchError`]; the caller
/// decides what a failure means (empty page, image-less album, skipped image).
#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// GET `url` with query parameters and return the body as text
    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<String, FetchError>;

    /// GET `url` and return the raw body bytes
    async fn get_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Production [`HttpFetcher`] backed by a shared `reqwest::Client`.
///
/// Sends the configured User-Agent, enforces the per-request timeout and redirect
/// limit, and retries transient failures according to [`RetryConfig`].
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    retry: RetryConfig,
}

impl ReqwestFetcher {
    /// Build a fetcher from source and retry settings
    pub fn new(source: &SourceConfig, retry: RetryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(source.user_agent.as_str())
            .timeout(source.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(source.max_redirects))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, retry })
    }

    async fn send(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<reqwest::Response, FetchError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::classify(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<String, FetchError> {
        fetch_with_retry(&self.retry, || async move {
            let response = self.send(url, query).await?;
            response.text().await.map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })
        })
        .await
    }

    async fn get_bytes(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError> {
        fetch_with_retry(&self.retry, || async move {
            let response = self.send(url, &[]).await?;
            let bytes = response.bytes().await.map_err(|e| FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            Ok(bytes.to_vec())
        })
        .await
    }
}
