//! Configuration types for album-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Remote source settings: where albums are listed and how they are recognized
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Listing endpoint (default: "http://www.toutiao.com/search_content/")
    #[serde(default = "default_listing_url")]
    pub listing_url: String,

    /// Search keyword sent with every listing request
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Tab selector restricting results to the gallery category (default: 3)
    #[serde(default = "default_gallery_tab")]
    pub gallery_tab: u32,

    /// Entries per listing page; offsets advance by this amount (default: 20)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Regex an entry's `article_url` must match to be accepted as an album
    #[serde(default = "default_album_url_pattern")]
    pub album_url_pattern: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// Maximum redirects followed before a request fails (default: 10)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            listing_url: default_listing_url(),
            keyword: default_keyword(),
            gallery_tab: default_gallery_tab(),
            page_size: default_page_size(),
            album_url_pattern: default_album_url_pattern(),
            user_agent: default_user_agent(),
            request_timeout: default_request_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}

/// Download behavior configuration (directories, concurrency)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Base download directory (default: "./downloads")
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    /// Staging directory for in-flight image writes (default: `<download_dir>/.partial`)
    ///
    /// Must live on the same filesystem as `download_dir` so the final rename is atomic.
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    /// Number of listing pages to walk per run (default: 3)
    #[serde(default = "default_pages")]
    pub pages: u32,

    /// Concurrent album workers per page (default: 10)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Concurrent image fetches inside one album (default: 1, strictly sequential)
    #[serde(default = "default_image_concurrency")]
    pub image_concurrency: usize,

    /// Extension given to every saved image regardless of its real format (default: "jpg")
    #[serde(default = "default_image_extension")]
    pub image_extension: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            temp_dir: None,
            pages: default_pages(),
            workers: default_workers(),
            image_concurrency: default_image_concurrency(),
            image_extension: default_image_extension(),
        }
    }
}

impl DownloadConfig {
    /// Effective staging directory
    pub fn staging_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| self.download_dir.join(".partial"))
    }
}

/// How the metadata store decides two album records are the same
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKey {
    /// Full-document equality: any changed field yields a new record (default)
    #[default]
    Document,
    /// Source URL only: the first record stored for a URL wins
    SourceUrl,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// SQLite database path (default: "./album-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Identity used by the metadata duplicate check
    #[serde(default)]
    pub metadata_key: MetadataKey,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            metadata_key: MetadataKey::default(),
        }
    }
}

/// Retry configuration for transient fetch failures
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Initial delay before first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 30 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Retry policy that never retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }
}

/// Main configuration for album-dl
///
/// Fields are organized into sub-configs:
/// - [`source`](SourceConfig) - listing endpoint, query shape, album link filter
/// - [`download`](DownloadConfig) - directories, workers, image concurrency
/// - [`persistence`](PersistenceConfig) - metadata database
/// - [`retry`](RetryConfig) - backoff for transient fetch failures
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote source settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// Metadata store settings
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Retry behavior for fetches
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::fs(path, e))?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would make a run meaningless or panic later
    pub fn validate(&self) -> Result<()> {
        if self.download.workers == 0 {
            return Err(Error::Config {
                message: "workers must be at least 1".to_string(),
                key: Some("download.workers".to_string()),
            });
        }
        if self.download.image_concurrency == 0 {
            return Err(Error::Config {
                message: "image_concurrency must be at least 1".to_string(),
                key: Some("download.image_concurrency".to_string()),
            });
        }
        if self.source.page_size == 0 {
            return Err(Error::Config {
                message: "page_size must be at least 1".to_string(),
                key: Some("source.page_size".to_string()),
            });
        }
        if self.download.image_extension.is_empty()
            || self.download.image_extension.contains(['/', '\\', '.'])
        {
            return Err(Error::Config {
                message: format!(
                    "invalid image extension '{}'",
                    self.download.image_extension
                ),
                key: Some("download.image_extension".to_string()),
            });
        }
        regex::Regex::new(&self.source.album_url_pattern).map_err(|e| Error::Config {
            message: format!("invalid album_url_pattern: {}", e),
            key: Some("source.album_url_pattern".to_string()),
        })?;
        Ok(())
    }
}

fn default_listing_url() -> String {
    "http://www.toutiao.com/search_content/".to_string()
}

fn default_keyword() -> String {
    "街拍".to_string()
}

fn default_gallery_tab() -> u32 {
    3
}

fn default_page_size() -> u32 {
    20
}

fn default_album_url_pattern() -> String {
    r"^https?://(www\.)?toutiao\.com/group/\d+/".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; WOW64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/66.0.3359.181 Safari/537.36".to_string()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_redirects() -> usize {
    10
}

fn default_download_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_pages() -> u32 {
    3
}

fn default_workers() -> usize {
    10
}

fn default_image_concurrency() -> usize {
    1
}

fn default_image_extension() -> String {
    "jpg".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("./album-dl.db")
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(30)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_true() -> bool {
    true
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
