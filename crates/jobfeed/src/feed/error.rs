//! Error types for the upstream feed API.

use thiserror::Error;

use crate::http::HttpError;

/// Errors that can occur when talking to the feed API.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// The request never produced a response (connect, timeout, reset).
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// API returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The requested page or entry does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(String),

    /// A page locator was empty or contained characters that cannot be a page id.
    #[error("Invalid page locator: {0:?}")]
    InvalidLocator(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FeedError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only transport failures and 408/429/5xx responses qualify. A missing
    /// page or a malformed payload fails the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            FeedError::Transport(_) => true,
            FeedError::Api { status, .. } => {
                *status == 408 || *status == 429 || (500..600).contains(status)
            }
            FeedError::NotFound(_)
            | FeedError::Json(_)
            | FeedError::InvalidLocator(_)
            | FeedError::Config(_) => false,
        }
    }

    /// Whether the payload was unusable, as opposed to unreachable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, FeedError::Json(_))
    }
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Json(err.to_string())
    }
}
