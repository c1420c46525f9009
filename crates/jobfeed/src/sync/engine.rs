//! The sync orchestrator.
//!
//! Pages are walked strictly in order. For each page the detail fetches run
//! concurrently, surviving records are committed one transaction each, and
//! only then is the cursor moved. A run interrupted at any point therefore
//! resumes at a page that was not yet fully committed.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::DatabaseConnection;

use super::error::SyncError;
use super::filter::{exclusion, summary_is_stale};
use super::normalize::{NormalizeError, normalize};
use super::progress::{ProgressCallback, SyncProgress, emit};
use super::scheduler::{FetchOutcome, FetchScheduler, dedup};
use super::seek::newest_item_date;
use super::types::{
    FailedItem, LAST_UPDATE_PARAMETER, SkipReason, SkippedItem, StopReason, StopSignal,
    SyncOptions, SyncSummary,
};
use crate::feed::{FeedError, FeedPage, FeedSource, FeedWalker, PageRequest, locator_from_url};
use crate::repository::{self, CursorUpdate};

/// Pick the first page: explicit override, else stored cursor, else anchor.
pub async fn resolve_start(
    db: &DatabaseConnection,
    options: &SyncOptions,
) -> Result<(PageRequest, &'static str), SyncError> {
    if let Some(raw) = options.start_locator.as_deref() {
        return Ok((PageRequest::locator(raw)?, "override"));
    }
    if let Some(cursor) = repository::read_cursor(db).await? {
        let locator = locator_from_url(&cursor.next_locator)?;
        return Ok((PageRequest::Locator(locator.to_string()), "cursor"));
    }
    Ok((PageRequest::from(options.anchor), "anchor"))
}

/// Where the cursor should point once `page` is done.
///
/// After a stop the current page is revisited. Otherwise the next page, or
/// the current page itself at the end of the chain.
fn cursor_target(page: &FeedPage, stopped: bool) -> Result<Option<String>, FeedError> {
    if stopped {
        return Ok(page.id.clone());
    }
    Ok(page.next_locator()?.or_else(|| page.id.clone()))
}

fn describe(request: &PageRequest) -> String {
    match request {
        PageRequest::First => "first".to_string(),
        PageRequest::Last => "last".to_string(),
        PageRequest::Locator(id) => id.clone(),
    }
}

/// Per-run mutable state shared by the page steps.
struct RunState<'a> {
    db: &'a DatabaseConnection,
    options: &'a SyncOptions,
    on_progress: Option<&'a ProgressCallback>,
    /// Triggered when the record limit is reached.
    limit_hit: StopSignal,
    summary: SyncSummary,
}

impl RunState<'_> {
    fn stopped(&self) -> bool {
        self.limit_hit.is_triggered() || self.options.stop_signal.is_triggered()
    }

    fn limit_reached(&self) -> bool {
        self.options
            .limit
            .is_some_and(|limit| self.summary.saved >= limit)
    }

    fn skip(&mut self, id: &str, reason: SkipReason) {
        tracing::debug!(id, %reason, "Skipping item");
        self.summary.skipped.push(SkippedItem {
            id: id.to_string(),
            reason,
        });
        emit(
            self.on_progress,
            SyncProgress::ItemSkipped {
                id: id.to_string(),
                reason,
            },
        );
    }

    fn fail(&mut self, id: &str, error: String) {
        tracing::warn!(id, error = %error, "Item failed");
        self.summary.failed.push(FailedItem {
            id: id.to_string(),
            error: error.clone(),
        });
        emit(
            self.on_progress,
            SyncProgress::ItemFailed {
                id: id.to_string(),
                error,
            },
        );
    }

    /// Filter, normalize and commit one fetched record.
    async fn commit(&mut self, outcome: FetchOutcome) {
        let FetchOutcome { item, result } = outcome;
        let id = item.id.as_str();

        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_malformed() => {
                tracing::warn!(id, error = %e, "Malformed detail record");
                self.skip(id, SkipReason::Malformed);
                return;
            }
            Err(e) => {
                self.fail(id, e.to_string());
                return;
            }
        };

        if let Some(reason) = exclusion(&record, self.options.since) {
            self.skip(id, reason);
            return;
        }

        let job = match normalize(&record) {
            Ok(job) => job,
            Err(NormalizeError::MissingIdentity) => {
                self.skip(id, SkipReason::MissingIdentity);
                return;
            }
        };

        match repository::save_job(self.db, &job).await {
            Ok(()) => {
                self.summary.saved += 1;
                emit(
                    self.on_progress,
                    SyncProgress::ItemSaved {
                        id: job.job.id.clone(),
                        saved_so_far: self.summary.saved,
                    },
                );
            }
            Err(e) => self.fail(id, e.to_string()),
        }
    }

    /// Fetch, filter and commit every item of one page.
    async fn process_page(&mut self, page: &FeedPage, scheduler: &FetchScheduler) {
        let (anonymous, identified): (Vec<_>, Vec<_>) = page
            .items
            .iter()
            .cloned()
            .partition(|item| item.id.trim().is_empty());
        for item in &anonymous {
            // Nothing to key on; the summary url or title stands in.
            let label = item.url.as_deref().or(item.title.as_deref()).unwrap_or("");
            self.skip(label, SkipReason::MissingIdentity);
        }

        let mut to_fetch = Vec::with_capacity(identified.len());
        for item in dedup(identified) {
            if self.options.prefilter_summary
                && let Some(since) = self.options.since
                && summary_is_stale(&item, since)
            {
                self.skip(&item.id, SkipReason::SummaryBeforeThreshold);
                continue;
            }
            to_fetch.push(item);
        }

        emit(
            self.on_progress,
            SyncProgress::PageFetched {
                page: page.id.clone(),
                items: page.items.len(),
                to_fetch: to_fetch.len(),
            },
        );

        let mut rx = scheduler.spawn(
            to_fetch,
            vec![self.limit_hit.clone(), self.options.stop_signal.clone()],
        );
        while let Some(outcome) = rx.recv().await {
            if self.stopped() {
                tracing::debug!(id = %outcome.item.id, "Discarding result after stop");
                continue;
            }
            self.commit(outcome).await;
            if self.limit_reached() {
                tracing::info!(saved = self.summary.saved, "Record limit reached");
                self.limit_hit.trigger();
            }
        }
    }

    /// Point the cursor past (or, after a stop, at) `page`.
    async fn advance_cursor(&mut self, page: &FeedPage) -> Result<(), SyncError> {
        let Some(locator) = cursor_target(page, self.stopped())? else {
            tracing::warn!("Page has no locator; cursor left unchanged");
            return Ok(());
        };

        let update = CursorUpdate {
            next_locator: locator.clone(),
            last_seen_date: newest_item_date(page),
            metadata: page.metadata(),
        };
        repository::write_cursor(self.db, &update).await?;

        tracing::info!(locator = %locator, saved = self.summary.saved, "Cursor advanced");
        emit(
            self.on_progress,
            SyncProgress::CursorAdvanced {
                locator: locator.clone(),
            },
        );
        self.summary.resume_locator = Some(locator);
        Ok(())
    }
}

/// Run one ingestion pass.
///
/// Item-level problems are collected in the returned summary. A page that
/// cannot be fetched, or a cursor that cannot be read or written, aborts the
/// run with the last written cursor left in place.
pub async fn run_sync(
    source: Arc<dyn FeedSource>,
    db: &DatabaseConnection,
    options: &SyncOptions,
    on_progress: Option<&ProgressCallback>,
) -> Result<SyncSummary, SyncError> {
    if options.reset {
        let removed = repository::clear_cursor(db).await?;
        tracing::info!(removed, "Cursor reset");
    }

    let (start, origin) = resolve_start(db, options).await?;
    tracing::info!(start = %describe(&start), origin, "Starting sync");
    emit(
        on_progress,
        SyncProgress::StartResolved {
            start: describe(&start),
            source: origin,
        },
    );

    let mut walker = FeedWalker::new(Arc::clone(&source), start.clone(), options.retry.clone());
    let scheduler = FetchScheduler::new(source, options.concurrency, options.retry.clone());
    let mut state = RunState {
        db,
        options,
        on_progress,
        limit_hit: StopSignal::new(),
        summary: SyncSummary {
            resume_locator: start.as_locator().map(str::to_string),
            ..Default::default()
        },
    };

    loop {
        if options.stop_signal.is_triggered() {
            state.summary.stop_reason = StopReason::Cancelled;
            break;
        }
        if state.limit_reached() {
            state.summary.stop_reason = StopReason::LimitReached;
            break;
        }

        let Some(page) = walker.next_page(on_progress).await else {
            state.summary.stop_reason = StopReason::Exhausted;
            break;
        };
        let page = page?;
        state.summary.pages += 1;

        state.process_page(&page, &scheduler).await;
        state.advance_cursor(&page).await?;

        if state.limit_hit.is_triggered() {
            state.summary.stop_reason = StopReason::LimitReached;
            break;
        }
        if options.stop_signal.is_triggered() {
            state.summary.stop_reason = StopReason::Cancelled;
            break;
        }
    }

    repository::set_parameter(db, LAST_UPDATE_PARAMETER, &Utc::now().to_rfc3339()).await?;

    let summary = state.summary;
    tracing::info!(
        pages = summary.pages,
        saved = summary.saved,
        skipped = summary.skipped_count(),
        failed = summary.failed_count(),
        stop_reason = %summary.stop_reason,
        "Sync complete"
    );
    emit(
        on_progress,
        SyncProgress::SyncComplete {
            pages: summary.pages,
            saved: summary.saved,
            skipped: summary.skipped_count(),
            failed: summary.failed_count(),
            stop_reason: summary.stop_reason,
        },
    );
    Ok(summary)
}
