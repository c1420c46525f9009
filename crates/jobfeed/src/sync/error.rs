use thiserror::Error;

use crate::feed::FeedError;
use crate::repository::RepositoryError;

/// Run-level failures.
///
/// Item-level problems never surface here; they are recorded in the run
/// summary instead.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The page chain could not be read (missing page, bad locator, retries
    /// exhausted).
    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    /// Cursor or parameter storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] RepositoryError),
}
