//! Source references - external documents consulted for an entity

use serde::{Deserialize, Serialize};

/// How a source should be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    /// Rendered web page
    Html,

    /// PDF document
    Pdf,
}

impl ContentKind {
    /// Classify a URL; anything containing `.pdf` is read as a PDF
    pub fn from_url(url: &str) -> Self {
        if url.contains(".pdf") {
            ContentKind::Pdf
        } else {
            ContentKind::Html
        }
    }

    /// Get the kind name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Html => "html",
            ContentKind::Pdf => "pdf",
        }
    }
}

/// What came of reading a source
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Extraction {
    /// Not attempted yet
    #[default]
    Pending,

    /// Window of text pulled from the document
    Extracted(String),

    /// Reading failed; the reason is kept for triage
    Failed(String),

    /// URL was a missing-value sentinel
    Skipped,
}

/// One external document candidate for an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReference {
    /// Document location
    pub url: String,

    /// Content-type hint derived from the URL
    pub kind: ContentKind,

    /// Extraction outcome
    pub extraction: Extraction,
}

impl SourceReference {
    /// Create a pending reference
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let kind = ContentKind::from_url(&url);
        Self {
            url,
            kind,
            extraction: Extraction::Pending,
        }
    }

    /// Whether the URL is a missing-value sentinel
    pub fn is_missing(&self) -> bool {
        is_missing_url(&self.url)
    }

    /// Extracted text, if any
    pub fn text(&self) -> Option<&str> {
        match &self.extraction {
            Extraction::Extracted(text) => Some(text),
            _ => None,
        }
    }
}

/// Empty strings and the `nan` marker stand for "no URL"
pub fn is_missing_url(url: &str) -> bool {
    let trimmed = url.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_url() {
        assert_eq!(
            ContentKind::from_url("https://x.gov/bio.pdf?page=2"),
            ContentKind::Pdf
        );
        assert_eq!(ContentKind::from_url("https://x.gov/bio"), ContentKind::Html);
    }

    #[test]
    fn test_missing_sentinels() {
        assert!(is_missing_url(""));
        assert!(is_missing_url("nan"));
        assert!(is_missing_url(" NaN "));
        assert!(!is_missing_url("https://nan.example"));
        assert!(SourceReference::new("").is_missing());
    }

    #[test]
    fn test_text_only_when_extracted() {
        let mut source = SourceReference::new("https://a.example");
        assert_eq!(source.text(), None);
        source.extraction = Extraction::Extracted("doe was born".into());
        assert_eq!(source.text(), Some("doe was born"));
    }
}
