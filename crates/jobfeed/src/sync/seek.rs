//! Locate the page where postings from a given date begin.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::normalize::parse_timestamp;
use crate::feed::{FeedError, FeedPage, FeedSource, FeedWalker, PageRequest};
use crate::retry::RetryConfig;

/// Newest parsable summary timestamp on a page.
pub fn newest_item_date(page: &FeedPage) -> Option<DateTime<Utc>> {
    page.items
        .iter()
        .filter_map(|item| item.date_modified.as_deref().and_then(parse_timestamp))
        .max()
}

/// Walk from the first page and return the locator of the first page whose
/// newest item was modified at or after `target`.
///
/// Returns `Ok(None)` if the feed ends first. Pages without any dated item
/// are passed over.
pub async fn find_page_for_date(
    source: Arc<dyn FeedSource>,
    target: DateTime<Utc>,
    retry: RetryConfig,
) -> Result<Option<String>, FeedError> {
    let mut walker = FeedWalker::new(source, PageRequest::First, retry);

    while let Some(page) = walker.next_page(None).await {
        let page = page?;
        if let Some(newest) = newest_item_date(&page)
            && newest >= target
        {
            tracing::info!(page = ?page.id, %newest, "Found start page");
            return Ok(page.id);
        }
    }

    tracing::info!(%target, pages = walker.pages_fetched(), "Feed ended before target date");
    Ok(None)
}
