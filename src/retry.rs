//! Retry logic with exponential backoff
//!
//! Transient fetch failures (timeouts, refused connections, 5xx, 429) are retried
//! with exponential backoff and optional jitter. Everything else fails on the
//! first attempt and is left to the caller's per-page or per-image isolation.
//!
//! # Example
//!
//! ```no_run
//! use album_dl::retry::fetch_with_retry;
//! use album_dl::config::RetryConfig;
//! use album_dl::error::FetchError;
//!
//! # async fn example() -> Result<(), FetchError> {
//! let config = RetryConfig::default();
//! let body = fetch_with_retry(&config, || async {
//!     Ok::<String, FetchError>("<html></html>".to_string())
//! }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Connect { .. } | FetchError::Timeout { .. } => true,
            // 5xx and rate limiting are worth another try, other statuses are final
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            // A body cut off mid-transfer is usually a dropped connection
            FetchError::Body { .. } => true,
            FetchError::Redirect { .. } | FetchError::Request { .. } => false,
        }
    }
}

/// Execute an async fetch with exponential backoff retry logic
///
/// Returns the successful result or the last error once attempts are exhausted
/// or a non-retryable error is seen.
pub async fn fetch_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::debug!(attempts = attempt + 1, "Fetch succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt = attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "Fetch failed, retrying"
                );

                let jittered_delay = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };

                tokio::time::sleep(jittered_delay).await;

                let next_delay =
                    Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next_delay.min(config.max_delay);
            }
            Err(e) => {
                if attempt > 0 {
                    tracing::debug!(
                        error = %e,
                        attempts = attempt + 1,
                        "Fetch failed after all retry attempts exhausted"
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Jitter is uniform between 0% and 100% of the delay, so the result lies in `[delay, 2 * delay]`.
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let jitter_factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + jitter_factor))
}
