//! Context assembly for an entity

use crate::anchor::anchored_window;
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::html::page_text;
use crate::http::PageFetcher;
use crate::pdf::pdf_text;
use dossier_domain::{ContentKind, EntityRecord, Extraction, SourceReference};
use std::sync::Arc;
use tracing::{debug, warn};

/// Reads an entity's sources and builds its context text
///
/// Each source is fetched in turn. Missing-value URLs are skipped, and a
/// source that fails to download or decode is logged and contributes
/// nothing. There is no retry here; a slow entity is bounded by the caller's
/// per-item timeout.
pub struct SourceFetcher<P> {
    pages: Arc<P>,
    config: FetchConfig,
}

impl<P> Clone for SourceFetcher<P> {
    fn clone(&self) -> Self {
        Self {
            pages: Arc::clone(&self.pages),
            config: self.config.clone(),
        }
    }
}

impl<P: PageFetcher> SourceFetcher<P> {
    /// Create a fetcher over a page source
    pub fn new(pages: P, config: FetchConfig) -> Self {
        Self {
            pages: Arc::new(pages),
            config,
        }
    }

    /// The configuration in use
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fill in every source's extraction and the entity's context
    ///
    /// The context is the space-joined window of each source that was read;
    /// skipped and failed sources are left out. Returns the context.
    pub async fn fetch(&self, entity: &mut EntityRecord) -> String {
        let anchors: Vec<String> = entity
            .candidate
            .anchor_candidates()
            .into_iter()
            .map(str::to_string)
            .collect();
        let anchors: Vec<&str> = anchors.iter().map(String::as_str).collect();

        let mut windows = Vec::new();
        for source in entity.sources.iter_mut() {
            source.extraction = self.read_source(source, &anchors).await;
            if let Extraction::Extracted(window) = &source.extraction {
                windows.push(window.clone());
            }
        }

        entity.context = windows.join(" ");
        debug!(
            id = %entity.id(),
            sources = entity.sources.len(),
            read = windows.len(),
            "assembled context"
        );
        entity.context.clone()
    }

    async fn read_source(&self, source: &SourceReference, anchors: &[&str]) -> Extraction {
        if source.is_missing() {
            return Extraction::Skipped;
        }
        match self.document_text(source).await {
            Ok(text) => Extraction::Extracted(anchored_window(&text, anchors, &self.config.anchor)),
            Err(e) => {
                warn!(url = %source.url, error = %e, "source could not be read");
                Extraction::Failed(e.to_string())
            }
        }
    }

    /// Lowercased full text of one source
    async fn document_text(&self, source: &SourceReference) -> Result<String, FetchError> {
        let body = self.pages.get(&source.url).await?;
        let text = match source.kind {
            ContentKind::Pdf => pdf_text(&body, self.config.max_pdf_pages)?,
            ContentKind::Html => page_text(&String::from_utf8_lossy(&body)),
        };
        Ok(text.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::MockPageFetcher;
    use dossier_domain::Candidate;

    fn entity(urls: &[&str]) -> EntityRecord {
        let c = Candidate::from_parts("jane", "q", "doe", "", "2016", "Vermont", "301");
        let mut e = EntityRecord::new(c).unwrap();
        e.sources = urls.iter().map(|u| SourceReference::new(*u)).collect();
        e
    }

    #[tokio::test]
    async fn test_context_joins_windows() {
        let pages = MockPageFetcher::new();
        pages.add_page("https://a.example", "<p>About Jane DOE: teacher</p>");
        pages.add_page("https://b.example", "<p>Rep. Doe chairs a committee</p>");
        let fetcher = SourceFetcher::new(pages, FetchConfig::default());

        let mut e = entity(&["https://a.example", "https://b.example"]);
        let context = fetcher.fetch(&mut e).await;

        assert_eq!(context, "doe: teacher doe chairs a committee");
        assert_eq!(e.context, context);
        assert_eq!(e.sources[0].text(), Some("doe: teacher"));
    }

    #[tokio::test]
    async fn test_missing_urls_are_skipped() {
        let pages = MockPageFetcher::new();
        let fetcher = SourceFetcher::new(pages.clone(), FetchConfig::default());

        let mut e = entity(&["", "nan"]);
        let context = fetcher.fetch(&mut e).await;

        assert_eq!(context, "");
        assert_eq!(pages.call_count(), 0);
        assert!(e.sources.iter().all(|s| s.extraction == Extraction::Skipped));
    }

    #[tokio::test]
    async fn test_failed_source_contributes_nothing() {
        let pages = MockPageFetcher::new();
        pages.add_page("https://ok.example", "doe won");
        pages.add_error(
            "https://bad.example",
            FetchError::Timeout {
                url: "https://bad.example".into(),
            },
        );
        let fetcher = SourceFetcher::new(pages, FetchConfig::default());

        let mut e = entity(&["https://bad.example", "https://ok.example"]);
        assert_eq!(fetcher.fetch(&mut e).await, "doe won");
        assert!(matches!(e.sources[0].extraction, Extraction::Failed(_)));
    }

    #[tokio::test]
    async fn test_anchor_falls_back_to_first_name() {
        let pages = MockPageFetcher::new();
        pages.add_page("https://a.example", "meet jane, a nurse");
        let fetcher = SourceFetcher::new(pages, FetchConfig::default());

        let mut e = entity(&["https://a.example"]);
        assert_eq!(fetcher.fetch(&mut e).await, "jane, a nurse");
    }

    #[tokio::test]
    async fn test_unreadable_pdf_is_failed() {
        let pages = MockPageFetcher::new();
        pages.add_page("https://x.gov/bio.pdf", "not really a pdf");
        let fetcher = SourceFetcher::new(pages, FetchConfig::default());

        let mut e = entity(&["https://x.gov/bio.pdf"]);
        assert_eq!(fetcher.fetch(&mut e).await, "");
        assert!(matches!(e.sources[0].extraction, Extraction::Failed(_)));
    }
}
