//! Jobfeed - resumable ingestion of a paginated job-posting feed.
//!
//! The feed is walked page by page from a persisted cursor. Each page's
//! detail records are fetched concurrently, normalized and committed one
//! transaction per record, and the cursor only moves once a page is done.
//!
//! # Features
//!
//! - `sqlite` (default) / `postgres` - database backends.
//! - `migrate` (default) - Enables database migration support. When enabled,
//!   you can use [`connect_and_migrate`] to run migrations and heal missing
//!   columns on connection.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use jobfeed::{connect_and_migrate, feed::FeedClient, sync::{SyncOptions, run_sync}};
//!
//! let db = connect_and_migrate("sqlite://jobfeed.db?mode=rwc").await?;
//! let client = Arc::new(FeedClient::new(jobfeed::feed::DEFAULT_FEED_URL, &token)?);
//!
//! let summary = run_sync(client, &db, &SyncOptions::default(), None).await?;
//! println!("saved {}, skipped {}", summary.saved, summary.skipped_count());
//! ```

pub mod db;
pub mod entity;
pub mod feed;
pub mod http;
pub mod repository;
pub mod retry;
pub mod schema;
pub mod sync;

#[cfg(feature = "migrate")]
pub mod migration;

pub use db::{connect, connect_with_pool};
#[cfg(feature = "migrate")]
pub use db::{connect_and_migrate, prepare_schema};
pub use entity::prelude::*;
pub use feed::{FeedClient, FeedError, FeedSource};
pub use repository::RepositoryError;
pub use sync::{SyncError, SyncOptions, SyncSummary, run_sync};
