//! Bounded-concurrency detail fetching for one page.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use super::types::StopSignal;
use crate::feed::{DetailRecord, FeedError, FeedItemRef, FeedSource};
use crate::retry::{RetryConfig, with_retry};

/// A finished fetch, still attached to the reference that caused it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub item: FeedItemRef,
    pub result: Result<DetailRecord, FeedError>,
}

/// Collapse repeated ids, keeping the first occurrence.
pub fn dedup(items: Vec<FeedItemRef>) -> Vec<FeedItemRef> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Fetches detail records for item references, at most `concurrency` at a time.
pub struct FetchScheduler {
    source: Arc<dyn FeedSource>,
    concurrency: usize,
    retry: RetryConfig,
}

impl FetchScheduler {
    pub fn new(source: Arc<dyn FeedSource>, concurrency: usize, retry: RetryConfig) -> Self {
        Self {
            source,
            concurrency: concurrency.max(1),
            retry,
        }
    }

    /// Start fetching `items` and return a receiver of outcomes in completion order.
    ///
    /// Items are submitted in order. Once any of `stops` is triggered no
    /// further items are submitted; fetches already running finish and are
    /// still delivered. The receiver closes when every submitted fetch has
    /// reported.
    pub fn spawn(
        &self,
        items: Vec<FeedItemRef>,
        stops: Vec<StopSignal>,
    ) -> mpsc::Receiver<FetchOutcome> {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let source = Arc::clone(&self.source);
        let retry = self.retry.clone();

        tokio::spawn(async move {
            for item in items {
                if any_triggered(&stops) {
                    break;
                }
                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    break;
                };
                if any_triggered(&stops) {
                    break;
                }

                let source = Arc::clone(&source);
                let retry = retry.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let result = fetch_detail(source.as_ref(), &item.id, &retry).await;
                    // The receiver may be gone if the run was aborted.
                    let _ = tx.send(FetchOutcome { item, result }).await;
                });
            }
        });

        rx
    }
}

fn any_triggered(stops: &[StopSignal]) -> bool {
    stops.iter().any(StopSignal::is_triggered)
}

async fn fetch_detail(
    source: &dyn FeedSource,
    id: &str,
    retry: &RetryConfig,
) -> Result<DetailRecord, FeedError> {
    let label = format!("feed entry {id}");
    with_retry(
        || source.fetch_entry(id),
        FeedError::is_transient,
        retry,
        &label,
        None,
    )
    .await
}
