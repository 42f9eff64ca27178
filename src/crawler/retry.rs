//! Retry and pacing around a `PageFetcher`
//!
//! # Retry Logic
//!
//! | Condition | Action |
//! |-----------|--------|
//! | HTTP status >= 400 | Retry up to `max_retries` times |
//! | No response (network error) | Retry up to `max_retries` times |
//! | Blocked by request policy | Immediate failure |
//!
//! The delay before retry `k` (k >= 1) is `base * 2^k` plus a jitter drawn
//! uniformly from `[0, jitter_max)`. Independently, a fixed pacing delay is
//! slept before every attempt, the first one included.

use crate::config::RetrySettings;
use crate::crawler::fetcher::{FetchError, FetchResult, PageFetcher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Backoff parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Base of the exponential backoff
    pub backoff_base: Duration,
    /// Exclusive upper bound of the random jitter
    pub jitter_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base: Duration::from_millis(500),
            jitter_max: Duration::from_millis(250),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_retries: settings.max_retries,
            backoff_base: settings.backoff_base,
            jitter_max: settings.jitter_max,
        }
    }
}

impl RetryPolicy {
    /// Attempts made before giving up
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Deterministic part of the delay before retry `attempt`: `base * 2^attempt`
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor)
    }

    /// Full delay before retry `attempt`, jitter included
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay(attempt).saturating_add(self.jitter())
    }

    fn jitter(&self) -> Duration {
        let max_nanos = u64::try_from(self.jitter_max.as_nanos()).unwrap_or(u64::MAX);
        if max_nanos == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rand::random_range(0..max_nanos))
    }
}

/// A fetch abandoned after exhausting its attempts
#[derive(Debug, Error)]
#[error("{url} failed after {attempts} attempt(s): {last}")]
pub struct FetchFailure {
    pub url: String,
    pub attempts: u32,
    #[source]
    pub last: FetchError,
}

/// Wraps a `PageFetcher` with pacing and retry/backoff
pub struct RetryingFetcher<F> {
    inner: F,
    policy: RetryPolicy,
    delay: Duration,
    attempts_made: AtomicU64,
}

impl<F: PageFetcher> RetryingFetcher<F> {
    pub fn new(inner: F, policy: RetryPolicy, delay: Duration) -> Self {
        Self {
            inner,
            policy,
            delay,
            attempts_made: AtomicU64::new(0),
        }
    }

    /// Total attempts issued through this fetcher, retries included
    pub fn attempts_made(&self) -> u64 {
        self.attempts_made.load(Ordering::Relaxed)
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// # Returns
    ///
    /// * `Ok(FetchResult)` - An attempt succeeded
    /// * `Err(FetchFailure)` - The last error, after `max_retries + 1`
    ///   attempts or a non-retryable failure
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, FetchFailure> {
        let total = self.policy.total_attempts();
        let mut attempt: u32 = 0;

        loop {
            if attempt > 0 {
                let backoff = self.policy.backoff(attempt);
                tracing::debug!(
                    "Backing off {:?} before retry {} of {}",
                    backoff,
                    attempt,
                    url
                );
                tokio::time::sleep(backoff).await;
            }

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            self.attempts_made.fetch_add(1, Ordering::Relaxed);
            let result = self.inner.fetch_page(url).await;
            attempt += 1;

            match result {
                Ok(fetched) => {
                    if attempt > 1 {
                        tracing::info!("Fetched {} on attempt {}/{}", url, attempt, total);
                    }
                    return Ok(fetched);
                }
                Err(e) if e.is_retryable() && attempt < total => {
                    tracing::warn!("Attempt {}/{} for {} failed: {}", attempt, total, url, e);
                }
                Err(e) => {
                    return Err(FetchFailure {
                        url: url.to_string(),
                        attempts: attempt,
                        last: e,
                    });
                }
            }
        }
    }
}
