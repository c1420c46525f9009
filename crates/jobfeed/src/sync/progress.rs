//! Progress reporting types for sync operations.
//!
//! Events are emitted through an optional callback so front ends can render
//! them however they like; the library itself only logs through `tracing`.

use super::types::{SkipReason, StopReason};

/// Progress events emitted during a sync run.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum SyncProgress {
    /// The start of the walk was resolved.
    StartResolved {
        /// Human-readable description: a locator, `first` or `last`.
        start: String,
        /// Where the start came from: `override`, `cursor` or `anchor`.
        source: &'static str,
    },

    /// A feed page was fetched.
    PageFetched {
        /// Page locator, when known.
        page: Option<String>,
        /// Item references on the page.
        items: usize,
        /// Distinct items that will be fetched.
        to_fetch: usize,
    },

    /// A record was committed.
    ItemSaved {
        id: String,
        /// Running total for the run.
        saved_so_far: usize,
    },

    /// An item was excluded.
    ItemSkipped { id: String, reason: SkipReason },

    /// An item could not be fetched or stored.
    ItemFailed { id: String, error: String },

    /// The stored cursor now points at `locator`.
    CursorAdvanced { locator: String },

    /// An outbound call failed and will be retried.
    Retrying {
        /// What was being fetched.
        label: String,
        /// Time to wait before retry (ms).
        retry_after_ms: u64,
        /// Attempt that just failed (1-indexed).
        attempt: u32,
        /// Error message.
        error: String,
    },

    /// The run finished.
    SyncComplete {
        pages: usize,
        saved: usize,
        skipped: usize,
        failed: usize,
        stop_reason: StopReason,
    },
}

/// Callback type for progress reporting.
pub type ProgressCallback = Box<dyn Fn(SyncProgress) + Send + Sync>;

/// Helper to emit progress events when a callback is present.
#[inline]
pub fn emit(on_progress: Option<&ProgressCallback>, event: SyncProgress) {
    if let Some(cb) = on_progress {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_with_callback() {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = Arc::clone(&count);

        let callback: ProgressCallback = Box::new(move |_event| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        emit(
            Some(&callback),
            SyncProgress::PageFetched {
                page: Some("p1".to_string()),
                items: 2,
                to_fetch: 2,
            },
        );
        emit(
            Some(&callback),
            SyncProgress::CursorAdvanced {
                locator: "p2".to_string(),
            },
        );

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_emit_without_callback() {
        emit(
            None,
            SyncProgress::ItemSaved {
                id: "a".to_string(),
                saved_so_far: 1,
            },
        );
    }

    #[test]
    fn test_sync_progress_debug() {
        let event = SyncProgress::ItemSkipped {
            id: "job-b".to_string(),
            reason: SkipReason::Inactive,
        };

        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("ItemSkipped"));
        assert!(debug_str.contains("job-b"));
        assert!(debug_str.contains("Inactive"));
    }
}
