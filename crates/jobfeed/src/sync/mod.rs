//! Feed synchronisation: filtering, concurrent detail fetching,
//! normalization and the orchestrating run loop.
//!
//! # Module Structure
//!
//! - [`types`] - `SyncOptions`, `SyncSummary`, `StopSignal`, constants
//! - [`progress`] - Progress reporting: `SyncProgress`, `ProgressCallback`, `emit()`
//! - [`normalize`] - Detail record to `NormalizedJob`
//! - [`filter`] - Status and date inclusion rules
//! - [`scheduler`] - `FetchScheduler`, bounded-concurrency detail fetches
//! - [`engine`] - `run_sync()`, the page-by-page orchestrator
//! - [`seek`] - `find_page_for_date()`
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jobfeed::feed::FeedClient;
//! use jobfeed::sync::{SyncOptions, run_sync};
//!
//! let client = Arc::new(FeedClient::new(jobfeed::feed::DEFAULT_FEED_URL, &token)?);
//! let db = jobfeed::connect_and_migrate("sqlite://jobs.db?mode=rwc").await?;
//! let summary = run_sync(client, &db, &SyncOptions::default(), None).await?;
//! println!("saved {} records", summary.saved);
//! ```

pub mod engine;
mod error;
pub mod filter;
pub mod normalize;
mod progress;
pub mod scheduler;
pub mod seek;
mod types;

pub use engine::{resolve_start, run_sync};
pub use error::SyncError;
pub use normalize::{
    CategoryRecord, ContactRecord, JobRecord, LocationRecord, NormalizeError, NormalizedJob,
    OccupationRecord, normalize, parse_timestamp,
};
pub use progress::{ProgressCallback, SyncProgress, emit};
pub use scheduler::{FetchOutcome, FetchScheduler};
pub use seek::find_page_for_date;
pub use types::{
    FailedItem, SkipReason, SkippedItem, StopReason, StopSignal, SyncOptions, SyncSummary,
};

// Re-export constants
pub use types::{
    DEFAULT_CONCURRENCY, DEFAULT_MAX_ATTEMPTS, INITIAL_BACKOFF_MS, LAST_UPDATE_PARAMETER,
    MAX_BACKOFF_MS,
};
