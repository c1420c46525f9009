//! Upstream job feed: wire types, HTTP client and page traversal.
//!
//! # Module Structure
//!
//! - [`types`] - Pages, item references and detail records as sent upstream
//! - [`client`] - `FeedClient`, the HTTP implementation of [`FeedSource`]
//! - [`walker`] - `FeedWalker`, lazy forward traversal of the page chain
//! - [`error`] - `FeedError` and its transient/permanent classification

pub mod client;
pub mod error;
pub mod types;
pub mod walker;

use async_trait::async_trait;

pub use client::{DEFAULT_FEED_URL, FeedClient};
pub use error::FeedError;
pub use types::{
    AdContent, Anchor, Category, Contact, DetailRecord, Employer, EmployerField, FeedItemRef,
    FeedMetadata, FeedPage, JobStatus, Occupation, PageRequest, WorkLocation, locator_from_url,
    validate_locator,
};
pub use walker::FeedWalker;

/// Anything that can serve feed pages and detail records.
///
/// The walker, scheduler and orchestrator only see this trait, so tests can
/// drive them with an in-memory feed.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch one page of the feed.
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage, FeedError>;

    /// Fetch the full detail record for an item id.
    async fn fetch_entry(&self, id: &str) -> Result<DetailRecord, FeedError>;
}
