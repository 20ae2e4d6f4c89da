//! Error types for album-dl
//!
//! This module provides the crate-wide error type plus two domain error families:
//! - [`DatabaseError`] for the metadata store
//! - [`FetchError`] for classified HTTP transport failures (listing, album pages, images)

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for album-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for album-dl
///
/// Each variant carries enough context to produce a useful log line. Only a
/// handful of these are ever fatal (startup: directories, database); the rest
/// are logged and swallowed at the album or page boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "download.workers")
        key: Option<String>,
    },

    /// Metadata store operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLx database error
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// HTTP fetch failed
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem operation failed on a specific path
    #[error("filesystem error at {path}: {source}")]
    Filesystem {
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid regular expression in configuration
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Insert failed
    #[error("insert failed: {0}")]
    InsertFailed(String),
}

/// Classified HTTP transport failure
///
/// Every network call in the pipeline resolves to either its payload or one of
/// these variants, so callers can decide per class whether to retry, skip the
/// page, or skip a single image.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// DNS failure, refused connection, reset, etc.
    #[error("connection to {url} failed: {message}")]
    Connect {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },

    /// The request exceeded the configured timeout
    #[error("request to {url} timed out")]
    Timeout {
        /// Requested URL
        url: String,
    },

    /// The server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// The redirect limit was exceeded
    #[error("too many redirects for {url}")]
    Redirect {
        /// Requested URL
        url: String,
    },

    /// The response body could not be read or decoded
    #[error("failed to read body from {url}: {message}")]
    Body {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },

    /// Any other request failure (invalid URL, builder error, ...)
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL
        url: String,
        /// Underlying error message
        message: String,
    },
}

impl FetchError {
    /// Classify a reqwest error raised while sending a request or reading its body
    pub fn classify(url: &str, err: &reqwest::Error) -> Self {
        let url = url.to_string();
        if err.is_timeout() {
            FetchError::Timeout { url }
        } else if err.is_redirect() {
            FetchError::Redirect { url }
        } else if err.is_connect() {
            FetchError::Connect {
                url,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url,
                status: status.as_u16(),
            }
        } else if err.is_body() || err.is_decode() {
            FetchError::Body {
                url,
                message: err.to_string(),
            }
        } else {
            FetchError::Request {
                url,
                message: err.to_string(),
            }
        }
    }

    /// URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            FetchError::Connect { url, .. }
            | FetchError::Timeout { url }
            | FetchError::Status { url, .. }
            | FetchError::Redirect { url }
            | FetchError::Body { url, .. }
            | FetchError::Request { url, .. } => url,
        }
    }
}
