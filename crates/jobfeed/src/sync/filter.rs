//! Inclusion rules applied before and after the detail fetch.

use chrono::{DateTime, Utc};

use super::normalize::parse_timestamp;
use super::types::SkipReason;
use crate::feed::{DetailRecord, FeedItemRef, JobStatus};

/// Pre-filter on the page summary timestamp.
///
/// True only when the summary timestamp parses and is strictly before
/// `since`. A missing or unparsable timestamp never excludes an item.
pub fn summary_is_stale(item: &FeedItemRef, since: DateTime<Utc>) -> bool {
    item.date_modified
        .as_deref()
        .and_then(parse_timestamp)
        .is_some_and(|modified| modified < since)
}

/// Decide whether a fetched record should be excluded.
///
/// Status and content are checked first and apply regardless of `since`.
/// The date rule uses the published timestamp, falling back to `updated`;
/// a record with neither is kept.
pub fn exclusion(record: &DetailRecord, since: Option<DateTime<Utc>>) -> Option<SkipReason> {
    if matches!(record.status, Some(JobStatus::Inactive)) {
        return Some(SkipReason::Inactive);
    }
    let Some(content) = record.content.as_ref().filter(|content| !content.is_empty()) else {
        return Some(SkipReason::NoContent);
    };

    let since = since?;
    let reference = content
        .published
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| content.updated.as_deref().and_then(parse_timestamp))?;

    (reference < since).then_some(SkipReason::BeforeThreshold)
}
