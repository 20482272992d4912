//! Page retrieval

use crate::config::FetchConfig;
use crate::error::FetchError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Retrieves the raw body behind a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body bytes
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`PageFetcher`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
}

impl HttpPageFetcher {
    /// Build a client with the configured timeout and user agent
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(url, bytes = body.len(), "fetched page");
        Ok(body.to_vec())
    }
}

#[derive(Debug, Clone)]
enum MockPage {
    Body(Vec<u8>),
    Error(FetchError),
    Hang,
}

/// In-memory [`PageFetcher`] for tests
///
/// Unknown URLs fail with a 404 status.
#[derive(Debug, Clone, Default)]
pub struct MockPageFetcher {
    pages: Arc<Mutex<HashMap<String, MockPage>>>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl MockPageFetcher {
    /// Create an empty fetcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixed delay to every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Serve `body` for `url`
    pub fn add_page(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.insert(url.into(), MockPage::Body(body.into()));
    }

    /// Fail `url` with `error`
    pub fn add_error(&self, url: impl Into<String>, error: FetchError) {
        self.insert(url.into(), MockPage::Error(error));
    }

    /// Never answer for `url`
    pub fn add_hang(&self, url: impl Into<String>) {
        self.insert(url.into(), MockPage::Hang);
    }

    /// Number of `get` calls made
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn insert(&self, url: String, page: MockPage) {
        self.pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url, page);
    }
}

#[async_trait]
impl PageFetcher for MockPageFetcher {
    async fn get(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let page = self
            .pages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned();
        match page {
            Some(MockPage::Body(body)) => Ok(body),
            Some(MockPage::Error(e)) => Err(e),
            Some(MockPage::Hang) => {
                std::future::pending::<()>().await;
                Err(FetchError::Timeout {
                    url: url.to_string(),
                })
            }
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_pages_and_errors() {
        let fetcher = MockPageFetcher::new();
        fetcher.add_page("https://a.example", "<p>hello</p>");
        fetcher.add_error(
            "https://b.example",
            FetchError::Network {
                url: "https://b.example".into(),
                message: "reset".into(),
            },
        );

        assert_eq!(fetcher.get("https://a.example").await.unwrap(), b"<p>hello</p>");
        assert!(matches!(
            fetcher.get("https://b.example").await,
            Err(FetchError::Network { .. })
        ));
        assert!(matches!(
            fetcher.get("https://c.example").await,
            Err(FetchError::Status { status: 404, .. })
        ));
        assert_eq!(fetcher.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_delay_still_answers() {
        let fetcher = MockPageFetcher::new().with_delay(Duration::from_millis(10));
        fetcher.add_page("https://a.example", "late");
        assert_eq!(fetcher.get("https://a.example").await.unwrap(), b"late");
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_hang_never_answers() {
        let fetcher = MockPageFetcher::new();
        fetcher.add_hang("https://slow.example");
        let result = tokio::time::timeout(
            Duration::from_millis(50),
            fetcher.get("https://slow.example"),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_unreachable_is_network_error() {
        let config = FetchConfig {
            http_timeout_secs: 5,
            ..Default::default()
        };
        let fetcher = HttpPageFetcher::new(&config).unwrap();
        let err = fetcher.get("http://127.0.0.1:1/bio").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Network { .. } | FetchError::Timeout { .. }
        ));
    }
}
