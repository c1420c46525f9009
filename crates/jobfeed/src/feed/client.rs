//! HTTP client for the job feed API.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;

use super::FeedSource;
use super::error::FeedError;
use super::types::{DetailRecord, ENTRY_PATH, FEED_PATH, FeedPage, PageRequest, validate_locator};
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};

/// Default public feed host.
pub const DEFAULT_FEED_URL: &str = "https://pam-stilling-feed.nav.no";

/// Per-request timeout for the reqwest transport.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("jobfeed/", env!("CARGO_PKG_VERSION"));

/// Job feed API client.
///
/// Cloning is cheap; clones share the underlying transport and its
/// connection pool.
#[derive(Clone)]
pub struct FeedClient {
    transport: Arc<dyn HttpTransport>,
    base_url: String,
    token: String,
}

impl FeedClient {
    /// Create a client for `base_url` authenticating with a bearer `token`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = FeedClient::new("https://pam-stilling-feed.nav.no", &token)?;
    /// let page = client.fetch_page(&PageRequest::Last).await?;
    /// ```
    pub fn new(base_url: &str, token: &str) -> Result<Self, FeedError> {
        let transport =
            ReqwestTransport::with_timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
                .map_err(|e| FeedError::Config(e.to_string()))?;
        Self::new_with_transport(base_url, token, Arc::new(transport))
    }

    pub fn new_with_transport(
        base_url: &str,
        token: &str,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, FeedError> {
        let base_url = base_url.trim().trim_end_matches('/');
        if base_url.is_empty() {
            return Err(FeedError::Config("feed URL is empty".to_string()));
        }
        if token.trim().is_empty() {
            return Err(FeedError::Config("feed API token is empty".to_string()));
        }
        Ok(Self {
            transport,
            base_url: base_url.to_string(),
            token: token.trim().to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for a page request.
    pub fn page_url(&self, request: &PageRequest) -> Result<String, FeedError> {
        Ok(match request {
            PageRequest::First => format!("{}{}", self.base_url, FEED_PATH),
            PageRequest::Last => format!("{}{}?last=true", self.base_url, FEED_PATH),
            PageRequest::Locator(id) => {
                format!("{}{}/{}", self.base_url, FEED_PATH, validate_locator(id)?)
            }
        })
    }

    /// Full URL for a detail record.
    pub fn entry_url(&self, id: &str) -> Result<String, FeedError> {
        Ok(format!(
            "{}{}/{}",
            self.base_url,
            ENTRY_PATH,
            validate_locator(id)?
        ))
    }

    /// Make an authenticated GET request and decode the JSON body.
    async fn get<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, FeedError> {
        let request = HttpRequest::get(url.clone())
            .header("Accept", "application/json")
            .header("User-Agent", USER_AGENT)
            .header("Authorization", format!("Bearer {}", self.token));

        let response: HttpResponse = self.transport.send(request).await?;

        if response.status == 404 {
            return Err(FeedError::NotFound(url));
        }
        if !response.is_success() {
            let message = String::from_utf8_lossy(&response.body).to_string();
            return Err(FeedError::Api {
                status: response.status,
                message,
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}

#[async_trait]
impl FeedSource for FeedClient {
    async fn fetch_page(&self, request: &PageRequest) -> Result<FeedPage, FeedError> {
        let url = self.page_url(request)?;
        tracing::debug!(url = %url, "Fetching feed page");
        let mut page: FeedPage = self.get(url).await?;
        if page.id.is_none() {
            page.id = request.as_locator().map(str::to_string);
        }
        Ok(page)
    }

    async fn fetch_entry(&self, id: &str) -> Result<DetailRecord, FeedError> {
        let url = self.entry_url(id)?;
        tracing::debug!(id, "Fetching feed entry");
        self.get(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpError, MockTransport, header_get};
    use serde_json::json;

    const BASE: &str = "https://feed.test";

    fn client(transport: &MockTransport) -> FeedClient {
        FeedClient::new_with_transport(BASE, "secret", Arc::new(transport.clone())).unwrap()
    }

    #[test]
    fn test_urls() {
        let transport = MockTransport::new();
        let client = FeedClient::new_with_transport("https://feed.test/", "t", Arc::new(transport))
            .unwrap();

        assert_eq!(
            client.page_url(&PageRequest::First).unwrap(),
            "https://feed.test/api/v1/feed"
        );
        assert_eq!(
            client.page_url(&PageRequest::Last).unwrap(),
            "https://feed.test/api/v1/feed?last=true"
        );
        assert_eq!(
            client
                .page_url(&PageRequest::Locator("p1".into()))
                .unwrap(),
            "https://feed.test/api/v1/feed/p1"
        );
        assert_eq!(
            client.entry_url("a-1").unwrap(),
            "https://feed.test/api/v1/feedentry/a-1"
        );
    }

    #[test]
    fn test_new_rejects_missing_credentials() {
        let transport = Arc::new(MockTransport::new());
        assert!(matches!(
            FeedClient::new_with_transport(BASE, " ", transport.clone()),
            Err(FeedError::Config(_))
        ));
        assert!(matches!(
            FeedClient::new_with_transport("", "t", transport),
            Err(FeedError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_auth_headers() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/api/v1/feed?last=true"),
            200,
            json!({"id": "p9", "items": [{"id": "a"}]}),
        );

        let page = client(&transport)
            .fetch_page(&PageRequest::Last)
            .await
            .unwrap();
        assert_eq!(page.id.as_deref(), Some("p9"));
        assert_eq!(page.items.len(), 1);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let headers = &requests[0].headers;
        assert_eq!(header_get(headers, "authorization"), Some("Bearer secret"));
        assert_eq!(header_get(headers, "accept"), Some("application/json"));
        assert!(header_get(headers, "user-agent").is_some());
    }

    #[tokio::test]
    async fn test_fetch_page_fills_missing_id_from_locator() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/api/v1/feed/p3"), 200, json!({"items": []}));

        let page = client(&transport)
            .fetch_page(&PageRequest::Locator("p3".into()))
            .await
            .unwrap();
        assert_eq!(page.id.as_deref(), Some("p3"));
    }

    #[tokio::test]
    async fn test_invalid_locator_is_rejected_without_a_request() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .fetch_page(&PageRequest::Locator("../etc".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::InvalidLocator(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let transport = MockTransport::new();
        transport.push_json(format!("{BASE}/api/v1/feedentry/gone"), 404, json!({}));
        transport.push_response(
            format!("{BASE}/api/v1/feedentry/busy"),
            HttpResponse {
                status: 503,
                headers: Vec::new(),
                body: b"try later".to_vec(),
            },
        );
        transport.push_response(
            format!("{BASE}/api/v1/feedentry/garbled"),
            HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: b"{not json".to_vec(),
            },
        );
        transport.push_error(
            format!("{BASE}/api/v1/feedentry/down"),
            HttpError::Transport("connection refused".into()),
        );

        let client = client(&transport);

        let not_found = client.fetch_entry("gone").await.unwrap_err();
        assert!(matches!(not_found, FeedError::NotFound(_)));
        assert!(!not_found.is_transient());

        let busy = client.fetch_entry("busy").await.unwrap_err();
        match &busy {
            FeedError::Api { status, message } => {
                assert_eq!(*status, 503);
                assert_eq!(message, "try later");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(busy.is_transient());

        let garbled = client.fetch_entry("garbled").await.unwrap_err();
        assert!(garbled.is_malformed());

        let down = client.fetch_entry("down").await.unwrap_err();
        assert!(matches!(down, FeedError::Transport(_)));
        assert!(down.is_transient());
    }

    #[tokio::test]
    async fn test_fetch_entry_decodes_detail() {
        let transport = MockTransport::new();
        transport.push_json(
            format!("{BASE}/api/v1/feedentry/a"),
            200,
            json!({"uuid": "a", "status": "ACTIVE", "ad_content": {"title": "Kokk"}}),
        );

        let record = client(&transport).fetch_entry("a").await.unwrap();
        assert_eq!(record.id.as_deref(), Some("a"));
        assert_eq!(
            record.content.and_then(|c| c.title).as_deref(),
            Some("Kokk")
        );
    }
}
