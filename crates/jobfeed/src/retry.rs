//! Shared retry policy for outbound feed calls.
//!
//! Page walks and detail fetches both go through [`with_retry`], so the
//! attempt cap and backoff curve live in one place instead of at each call site.

use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};

use crate::sync::{
    DEFAULT_MAX_ATTEMPTS, INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, ProgressCallback, SyncProgress,
};

/// Configuration for retry operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Minimum delay between retries.
    pub min_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Maximum number of retries after the first attempt.
    pub max_retries: usize,
    /// Whether to add jitter to delays.
    pub with_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_delay: Duration::from_millis(MAX_BACKOFF_MS),
            max_retries: (DEFAULT_MAX_ATTEMPTS - 1) as usize,
            with_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom values.
    #[must_use]
    pub fn new(min_delay: Duration, max_delay: Duration, max_retries: usize) -> Self {
        Self {
            min_delay,
            max_delay,
            max_retries,
            with_jitter: true,
        }
    }

    /// A policy that makes exactly one attempt.
    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, 0).with_jitter(false)
    }

    /// Set whether to use jitter.
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.with_jitter = jitter;
        self
    }

    /// Total number of attempts, including the first one.
    #[must_use]
    pub fn max_attempts(&self) -> usize {
        self.max_retries + 1
    }

    /// Build an exponential backoff strategy from this configuration.
    #[must_use]
    pub fn into_backoff(self) -> ExponentialBuilder {
        let mut builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_delay(self.max_delay)
            .with_max_times(self.max_retries);

        if self.with_jitter {
            builder = builder.with_jitter();
        }

        builder
    }
}

/// Execute an operation, retrying errors that `is_retryable` accepts.
///
/// Non-retryable errors return immediately. Each retry is logged at `warn`
/// level and reported as [`SyncProgress::Retrying`] when a callback is given.
///
/// # Example
///
/// ```ignore
/// use jobfeed::retry::{RetryConfig, with_retry};
///
/// let page = with_retry(
///     || async { source.fetch_page(&request).await },
///     FeedError::is_transient,
///     &RetryConfig::default(),
///     "feed page",
///     None,
/// )
/// .await?;
/// ```
pub async fn with_retry<T, E, F, Fut, IsRetryable>(
    mut operation: F,
    is_retryable: IsRetryable,
    config: &RetryConfig,
    label: &str,
    on_progress: Option<&ProgressCallback>,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    IsRetryable: Fn(&E) -> bool,
{
    let attempt = AtomicU32::new(0);

    let retry_op = || {
        attempt.fetch_add(1, Ordering::SeqCst);
        operation()
    };

    retry_op
        .retry(config.clone().into_backoff())
        .notify(|err: &E, dur: Duration| {
            let current_attempt = attempt.load(Ordering::SeqCst);
            if let Some(cb) = on_progress {
                cb(SyncProgress::Retrying {
                    label: label.to_string(),
                    retry_after_ms: dur.as_millis() as u64,
                    attempt: current_attempt,
                    error: err.to_string(),
                });
            }
            tracing::warn!(
                label,
                attempt = current_attempt,
                max_attempts = config.max_attempts(),
                delay_ms = dur.as_millis() as u64,
                error = %err,
                "Request failed, retrying"
            );
        })
        .when(|e: &E| is_retryable(e))
        .await
}
