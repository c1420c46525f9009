//! Sync options, run summaries and constants.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::feed::Anchor;
use crate::retry::RetryConfig;

/// Default number of concurrent detail fetches per page.
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Attempts per outbound call, including the first.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Initial backoff delay in milliseconds.
pub const INITIAL_BACKOFF_MS: u64 = 1_000;

/// Maximum backoff delay in milliseconds.
pub const MAX_BACKOFF_MS: u64 = 8_000;

/// System parameter recording when the last run finished.
pub const LAST_UPDATE_PARAMETER: &str = "feed_last_update";

/// Shared cancellation flag.
///
/// Cloning shares the flag. Once triggered it stays triggered.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for one sync run.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Explicit start locator; wins over the stored cursor.
    pub start_locator: Option<String>,
    /// Where to start when there is neither an override nor a cursor.
    pub anchor: Anchor,
    /// Stop after this many records have been saved.
    pub limit: Option<usize>,
    /// Skip records last published/updated before this instant.
    pub since: Option<DateTime<Utc>>,
    /// Maximum concurrent detail fetches.
    pub concurrency: usize,
    /// Retry policy for page and detail fetches.
    pub retry: RetryConfig,
    /// Skip items whose summary timestamp is before `since` without fetching them.
    pub prefilter_summary: bool,
    /// Discard the stored cursor before resolving the start.
    pub reset: bool,
    /// External cancellation (Ctrl+C).
    pub stop_signal: StopSignal,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            start_locator: None,
            anchor: Anchor::default(),
            limit: None,
            since: None,
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryConfig::default(),
            prefilter_summary: false,
            reset: false,
            stop_signal: StopSignal::new(),
        }
    }
}

/// Why an item was not saved, for items that are not failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Summary timestamp before the threshold (pre-filter; never fetched).
    SummaryBeforeThreshold,
    /// Upstream status is `INACTIVE`.
    Inactive,
    /// Detail record has no ad content.
    NoContent,
    /// Published (else updated) timestamp before the threshold.
    BeforeThreshold,
    /// Detail record carries no identity.
    MissingIdentity,
    /// Detail payload could not be decoded.
    Malformed,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::SummaryBeforeThreshold => "summary_before_threshold",
            SkipReason::Inactive => "inactive",
            SkipReason::NoContent => "no_content",
            SkipReason::BeforeThreshold => "before_threshold",
            SkipReason::MissingIdentity => "missing_identity",
            SkipReason::Malformed => "malformed",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedItem {
    pub id: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedItem {
    pub id: String,
    pub error: String,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopReason {
    /// The page chain ended.
    #[default]
    Exhausted,
    /// The record limit was reached.
    LimitReached,
    /// The stop signal was triggered.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StopReason::Exhausted => "feed exhausted",
            StopReason::LimitReached => "limit reached",
            StopReason::Cancelled => "cancelled",
        })
    }
}

/// Outcome of a sync run.
#[derive(Debug, Clone, Default)]
pub struct SyncSummary {
    /// Pages fully or partially processed.
    pub pages: usize,
    /// Records committed.
    pub saved: usize,
    pub skipped: Vec<SkippedItem>,
    pub failed: Vec<FailedItem>,
    pub stop_reason: StopReason,
    /// Locator the stored cursor points at after the run.
    pub resume_locator: Option<String>,
}

impl SyncSummary {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_options_default() {
        let options = SyncOptions::default();

        assert_eq!(options.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(options.anchor, Anchor::MostRecent);
        assert!(options.limit.is_none());
        assert!(!options.prefilter_summary);
        assert!(!options.reset);
        assert!(!options.stop_signal.is_triggered());
        assert_eq!(
            options.retry.max_attempts(),
            DEFAULT_MAX_ATTEMPTS as usize
        );
    }

    #[test]
    fn test_stop_signal_is_shared_between_clones() {
        let signal = StopSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_triggered());

        signal.trigger();
        assert!(clone.is_triggered());
    }

    #[test]
    fn test_sync_summary_default() {
        let summary = SyncSummary::default();
        assert_eq!(summary.saved, 0);
        assert_eq!(summary.skipped_count(), 0);
        assert_eq!(summary.failed_count(), 0);
        assert_eq!(summary.stop_reason, StopReason::Exhausted);
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(
            SkipReason::SummaryBeforeThreshold.to_string(),
            "summary_before_threshold"
        );
        assert_eq!(SkipReason::Inactive.to_string(), "inactive");
        assert_eq!(StopReason::LimitReached.to_string(), "limit reached");
    }
}
