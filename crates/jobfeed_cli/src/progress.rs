//! Progress reporting for sync operations.
//!
//! Library progress events are turned into structured `tracing` records.

use std::sync::Arc;

use jobfeed::sync::{ProgressCallback, SyncProgress};

/// Logging reporter using tracing for structured output.
pub struct LoggingReporter;

impl LoggingReporter {
    pub fn new() -> Self {
        Self
    }

    /// Convert to a ProgressCallback for the library.
    pub fn as_callback(self: &Arc<Self>) -> ProgressCallback {
        let reporter = Arc::clone(self);
        Box::new(move |event| reporter.handle(event))
    }

    pub fn handle(&self, event: SyncProgress) {
        match event {
            SyncProgress::StartResolved { start, source } => {
                tracing::info!(start = %start, source, "Resolved start page");
            }

            SyncProgress::PageFetched {
                page,
                items,
                to_fetch,
            } => {
                tracing::info!(page = ?page, items, to_fetch, "Fetched page");
            }

            SyncProgress::ItemSaved { id, saved_so_far } => {
                tracing::debug!(id = %id, saved_so_far, "Saved");
            }

            SyncProgress::ItemSkipped { id, reason } => {
                tracing::debug!(id = %id, reason = %reason, "Skipped");
            }

            SyncProgress::ItemFailed { id, error } => {
                tracing::warn!(id = %id, error = %error, "Failed");
            }

            SyncProgress::CursorAdvanced { locator } => {
                tracing::debug!(locator = %locator, "Cursor advanced");
            }

            SyncProgress::Retrying {
                label,
                retry_after_ms,
                attempt,
                error,
            } => {
                tracing::warn!(
                    label = %label,
                    retry_after_ms,
                    attempt,
                    error = %error,
                    "Retrying"
                );
            }

            SyncProgress::SyncComplete {
                pages,
                saved,
                skipped,
                failed,
                stop_reason,
            } => {
                tracing::info!(pages, saved, skipped, failed, stop_reason = %stop_reason, "Sync finished");
            }

            _ => {}
        }
    }
}

impl Default for LoggingReporter {
    fn default() -> Self {
        Self::new()
    }
}
