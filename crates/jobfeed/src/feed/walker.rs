//! Lazy page-by-page traversal of the feed chain.

use std::sync::Arc;

use super::FeedSource;
use super::error::FeedError;
use super::types::{FeedPage, PageRequest};
use crate::retry::{RetryConfig, with_retry};
use crate::sync::ProgressCallback;

#[derive(Debug, Clone, PartialEq, Eq)]
enum WalkState {
    Pending(PageRequest),
    Finished,
}

/// Walks the feed forward from a start request, one page per call.
///
/// Pages are fetched only when asked for. After the last page (no next
/// locator) or after any error the walker is finished; to continue, build a
/// new walker from a fresh locator.
pub struct FeedWalker {
    source: Arc<dyn FeedSource>,
    retry: RetryConfig,
    state: WalkState,
    pages_fetched: usize,
}

impl FeedWalker {
    pub fn new(source: Arc<dyn FeedSource>, start: PageRequest, retry: RetryConfig) -> Self {
        Self {
            source,
            retry,
            state: WalkState::Pending(start),
            pages_fetched: 0,
        }
    }

    /// The request the next call will issue, if the walk is not over.
    pub fn pending(&self) -> Option<&PageRequest> {
        match &self.state {
            WalkState::Pending(request) => Some(request),
            WalkState::Finished => None,
        }
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    /// Fetch the next page in the chain.
    ///
    /// Returns `None` once the chain is exhausted. Transient failures are
    /// retried; a missing page or bad locator fails on the first attempt. A
    /// page whose next pointer is present but unusable is reported as an
    /// error instead of being treated as the end of the chain.
    pub async fn next_page(
        &mut self,
        on_progress: Option<&ProgressCallback>,
    ) -> Option<Result<FeedPage, FeedError>> {
        let request = match std::mem::replace(&mut self.state, WalkState::Finished) {
            WalkState::Pending(request) => request,
            WalkState::Finished => return None,
        };

        let label = match &request {
            PageRequest::First => "feed page (first)".to_string(),
            PageRequest::Last => "feed page (last)".to_string(),
            PageRequest::Locator(id) => format!("feed page {id}"),
        };

        let source = Arc::clone(&self.source);
        let result = with_retry(
            || {
                let source = Arc::clone(&source);
                let request = request.clone();
                async move { source.fetch_page(&request).await }
            },
            FeedError::is_transient,
            &self.retry,
            &label,
            on_progress,
        )
        .await;

        match result {
            Ok(page) => {
                self.pages_fetched += 1;
                match page.next_locator() {
                    Ok(Some(next)) => self.state = WalkState::Pending(PageRequest::Locator(next)),
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(
                            page = page.id.as_deref().unwrap_or("?"),
                            error = %e,
                            "Feed page carries an unusable next pointer"
                        );
                        return Some(Err(e));
                    }
                }
                tracing::debug!(
                    page = page.id.as_deref().unwrap_or("?"),
                    items = page.items.len(),
                    has_next = self.pending().is_some(),
                    "Fetched feed page"
                );
                Some(Ok(page))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedClient;
    use crate::http::{HttpError, MockTransport};
    use serde_json::json;

    const BASE: &str = "https://feed.test";

    fn walker(transport: &MockTransport, start: PageRequest) -> FeedWalker {
        let client =
            FeedClient::new_with_transport(BASE, "t", Arc::new(transport.clone())).unwrap();
        let retry = RetryConfig::new(
            std::time::Duration::from_millis(10),
            std::time::Duration::from_millis(20),
            2,
        )
        .with_jitter(false);
        FeedWalker::new(Arc::new(client), start, retry)
    }

    #[tokio::test]
    async fn test_walks_chain_until_no_next() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/api/v1/feed"),
            200,
            json!({"id": "p1", "next_id": "p2", "items": []}),
        );
        transport.push_json(
            format!("{BASE}/api/v1/feed/p2"),
            200,
            json!({"id": "p2", "next_url": "/api/v1/feed/p3", "items": []}),
        );
        transport.push_json(
            format!("{BASE}/api/v1/feed/p3"),
            200,
            json!({"id": "p3", "items": []}),
        );

        let mut walker = walker(&transport, PageRequest::First);
        let mut ids = Vec::new();
        while let Some(page) = walker.next_page(None).await {
            ids.push(page.unwrap().id.unwrap());
        }

        assert_eq!(ids, vec!["p1", "p2", "p3"]);
        assert_eq!(walker.pages_fetched(), 3);
        assert!(walker.next_page(None).await.is_none());
    }

    #[tokio::test]
    async fn test_is_lazy() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/api/v1/feed/p5"),
            200,
            json!({"id": "p5", "next_id": "p6", "items": []}),
        );

        let mut walker = walker(&transport, PageRequest::Locator("p5".into()));
        assert!(transport.requests().is_empty());

        walker.next_page(None).await.unwrap().unwrap();
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(
            walker.pending(),
            Some(&PageRequest::Locator("p6".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_page_errors() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/api/v1/feed/p1");
        transport.push_error(url.clone(), HttpError::Transport("reset".into()));
        transport.push_json(url.clone(), 502, json!({}));
        transport.push_json(url.clone(), 200, json!({"id": "p1", "items": []}));

        let mut walker = walker(&transport, PageRequest::Locator("p1".into()));
        let page = walker.next_page(None).await.unwrap().unwrap();
        assert_eq!(page.id.as_deref(), Some("p1"));
        assert_eq!(transport.request_count(&url), 3);
    }

    #[tokio::test]
    async fn test_unusable_next_pointer_fails_instead_of_ending() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/api/v1/feed/p1");
        transport.push_json(
            url.clone(),
            200,
            json!({"id": "p1", "next_id": "p2:bad", "items": []}),
        );

        let mut walker = walker(&transport, PageRequest::Locator("p1".into()));
        let err = walker.next_page(None).await.unwrap().unwrap_err();
        assert!(matches!(err, FeedError::InvalidLocator(ref l) if l == "p2:bad"));
        assert_eq!(walker.pages_fetched(), 1);
        assert!(walker.next_page(None).await.is_none());
    }

    #[tokio::test]
    async fn test_missing_page_fails_immediately_and_finishes() {
        let transport = MockTransport::new();
        let url = format!("{BASE}/api/v1/feed/gone");
        transport.push_json(url.clone(), 404, json!({}));

        let mut walker = walker(&transport, PageRequest::Locator("gone".into()));
        let err = walker.next_page(None).await.unwrap().unwrap_err();
        assert!(matches!(err, FeedError::NotFound(_)));
        assert_eq!(transport.request_count(&url), 1);
        assert!(walker.next_page(None).await.is_none());
    }
}
