//! Web search collaborators

use crate::error::SearchError;
use async_trait::async_trait;
use dossier_domain::SearchProvider;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Default Custom Search endpoint
pub const DEFAULT_SEARCH_URL: &str = "https://www.googleapis.com";

/// Google Custom Search JSON API
///
/// Results are restricted to English pages from the United States. No retry
/// is done here; wrap the provider in `Retrying` for that.
#[derive(Debug, Clone)]
pub struct GoogleSearchProvider {
    client: reqwest::Client,
    api_key: String,
    engine_id: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    link: String,
}

impl GoogleSearchProvider {
    /// Create a provider from an API key and search engine id
    pub fn new(api_key: impl Into<String>, engine_id: impl Into<String>) -> Result<Self, SearchError> {
        let api_key = api_key.into();
        let engine_id = engine_id.into();
        if api_key.trim().is_empty() {
            return Err(SearchError::Configuration("API key is empty".to_string()));
        }
        if engine_id.trim().is_empty() {
            return Err(SearchError::Configuration(
                "search engine id is empty".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SearchError::Configuration(e.to_string()))?;
        Ok(Self {
            client,
            api_key,
            engine_id,
            base_url: DEFAULT_SEARCH_URL.to_string(),
        })
    }

    /// Point at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// Links from a Custom Search response body, in rank order
fn result_links(body: &str) -> Result<Vec<String>, SearchError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| SearchError::InvalidResponse(e.to_string()))?;
    Ok(response.items.into_iter().map(|item| item.link).collect())
}

#[async_trait]
impl SearchProvider for GoogleSearchProvider {
    type Error = SearchError;

    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<String>, SearchError> {
        let url = format!("{}/customsearch/v1", self.base_url);
        let num = num_results.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query),
                ("lr", "lang_en"),
                ("cr", "us"),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| SearchError::Communication(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SearchError::RateLimitExceeded);
        }
        let body = response
            .text()
            .await
            .map_err(|e| SearchError::Communication(e.to_string()))?;
        if !status.is_success() {
            return Err(SearchError::Communication(format!("HTTP {}: {}", status, body)));
        }

        let links = result_links(&body)?;
        debug!(query, results = links.len(), "search complete");
        Ok(links)
    }
}

/// Deterministic [`SearchProvider`] for tests
///
/// Queries without a registered answer return no results.
#[derive(Debug, Clone, Default)]
pub struct MockSearchProvider {
    results: Arc<Mutex<HashMap<String, Result<Vec<String>, SearchError>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockSearchProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `query` with `links`
    pub fn add_results(&self, query: impl Into<String>, links: Vec<String>) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(query.into(), Ok(links));
    }

    /// Fail `query` with `error`
    pub fn add_error(&self, query: impl Into<String>, error: SearchError) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(query.into(), Err(error));
    }

    /// Number of searches made
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    type Error = SearchError;

    async fn search(&self, query: &str, num_results: u8) -> Result<Vec<String>, SearchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let answer = self
            .results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(query)
            .cloned();
        match answer {
            Some(Ok(links)) => Ok(links.into_iter().take(num_results as usize).collect()),
            Some(Err(e)) => Err(e),
            None => Ok(Vec::new()),
        }
    }
}
