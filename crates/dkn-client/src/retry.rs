//! Retry with exponential backoff for idempotent reads.
//!
//! Only reads (resource detail, listings, profile) go through this module.
//! Mutations are dispatched exactly once: a second submit or decision would
//! append a second entry to the review log, so a retry of a mutation is
//! always a new explicit user action.
//!
//! # Example
//!
//! ```rust,no_run
//! use dkn_client::retry::{with_retry_if, RetryConfig};
//!
//! #[derive(Debug)]
//! enum FetchError {
//!     Unavailable,
//!     Missing,
//! }
//!
//! async fn example() -> Result<String, FetchError> {
//!     with_retry_if(
//!         &RetryConfig::fast(),
//!         "GET /knowledge/resources/1/",
//!         || async { Err(FetchError::Unavailable) },
//!         |err| matches!(err, FetchError::Unavailable),
//!     )
//!     .await
//! }
//! ```

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Configuration for retry behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,

    /// Delay before the first retry
    pub initial_delay: Duration,

    /// Upper bound for any single delay
    pub max_delay: Duration,

    /// Backoff multiplier (typically 2.0)
    pub exponential_base: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            exponential_base: 2.0,
        }
    }
}

impl RetryConfig {
    /// Short delays, for tests and local servers.
    pub fn fast() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(1),
            exponential_base: 2.0,
        }
    }

    /// The default policy.
    pub fn standard() -> Self {
        Self::default()
    }

    /// Longer delays for a struggling server.
    pub fn slow() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            exponential_base: 2.0,
        }
    }

    /// A single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::from_millis(0),
            max_delay: Duration::from_millis(0),
            exponential_base: 1.0,
        }
    }

    /// Standard delays with `attempts` total attempts (at least one).
    pub fn with_attempts(attempts: u32) -> Self {
        Self {
            max_attempts: attempts.max(1),
            ..Self::standard()
        }
    }

    /// Next backoff delay, never above `max_delay`.
    ///
    /// A base below 1.0 (or NaN) keeps the delay constant.
    fn next_delay(&self, delay: Duration) -> Duration {
        let base = if self.exponential_base >= 1.0 {
            self.exponential_base
        } else {
            1.0
        };
        let next = delay.as_secs_f64() * base;
        let max = self.max_delay.as_secs_f64();
        if next.is_finite() && next < max {
            Duration::from_secs_f64(next)
        } else {
            self.max_delay
        }
    }
}

/// Run `f`, retrying errors for which `is_retryable` returns true.
///
/// # Arguments
///
/// * `config` - Retry configuration
/// * `operation` - Label used in log events (e.g. `"GET /knowledge/resources/mine/"`)
/// * `f` - Operation to run; called once per attempt
/// * `is_retryable` - Predicate selecting the errors worth another attempt
///
/// # Returns
///
/// The first success, the first non-retryable error, or the last error once
/// attempts are exhausted
pub async fn with_retry_if<F, Fut, T, E, P>(
    config: &RetryConfig,
    operation: &str,
    mut f: F,
    mut is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
    P: FnMut(&E) -> bool,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        attempt += 1;

        match f().await {
            Ok(result) => {
                if attempt > 1 {
                    info!(operation, attempts = attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if !is_retryable(&e) => {
                debug!(operation, error = ?e, "Error is not retryable, returning immediately");
                return Err(e);
            }
            Err(e) if attempt >= config.max_attempts => {
                error!(operation, attempts = attempt, error = ?e, "All retry attempts exhausted");
                return Err(e);
            }
            Err(e) => {
                warn!(
                    operation,
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = ?e,
                    "Attempt failed, retrying"
                );

                sleep(delay).await;
                delay = config.next_delay(delay);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Transient,
        Permanent,
    }

    fn quick(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            exponential_base: 2.0,
        }
    }

    #[test]
    fn test_retry_config_presets() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(100));
        assert_eq!(RetryConfig::standard(), config);

        assert_eq!(RetryConfig::fast().initial_delay, Duration::from_millis(50));
        assert_eq!(RetryConfig::slow().max_attempts, 5);
        assert_eq!(RetryConfig::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_with_attempts_floor() {
        assert_eq!(RetryConfig::with_attempts(0).max_attempts, 1);
        assert_eq!(RetryConfig::with_attempts(4).max_attempts, 4);
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            max_attempts: 5,
            initial_delay: Duration::from_millis(400),
            max_delay: Duration::from_millis(500),
            exponential_base: 2.0,
        };
        assert_eq!(config.next_delay(Duration::from_millis(100)), Duration::from_millis(200));
        assert_eq!(config.next_delay(Duration::from_millis(400)), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_base_keeps_delay() {
        for base in [f64::NAN, -2.0, 0.5, f64::NEG_INFINITY] {
            let config = RetryConfig {
                exponential_base: base,
                ..quick(3)
            };
            assert_eq!(config.next_delay(Duration::from_millis(4)), Duration::from_millis(4));
        }

        let runaway = RetryConfig {
            exponential_base: f64::INFINITY,
            ..quick(3)
        };
        assert_eq!(runaway.next_delay(Duration::from_millis(4)), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = with_retry_if(
            &quick(3),
            "read",
            || {
                let counter = counter_clone.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(TestError::Transient)
                    } else {
                        Ok(42)
                    }
                }
            },
            |e| *e == TestError::Transient,
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_error_returns_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<i32, _> = with_retry_if(
            &quick(5),
            "read",
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Permanent)
                }
            },
            |e| *e == TestError::Transient,
        )
        .await;

        assert_eq!(result, Err(TestError::Permanent));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausts_attempts() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<i32, _> = with_retry_if(
            &quick(2),
            "read",
            || {
                let counter = counter_clone.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(TestError::Transient)
                }
            },
            |_| true,
        )
        .await;

        assert_eq!(result, Err(TestError::Transient));
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }
}
