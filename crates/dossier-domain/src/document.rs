//! Case documents from state medical boards

use serde::{Deserialize, Serialize};

/// One disciplinary case document
///
/// Field names match the columns of the document table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseDocument {
    /// Document identifier
    pub iddoc: String,

    /// Raw case text
    #[serde(default)]
    pub textdata: String,

    /// Issuing state
    #[serde(default)]
    pub state: String,

    /// Year of the action
    #[serde(default)]
    pub year: String,
}

impl CaseDocument {
    /// Create a document
    pub fn new(
        iddoc: impl Into<String>,
        textdata: impl Into<String>,
        state: impl Into<String>,
        year: impl Into<String>,
    ) -> Self {
        Self {
            iddoc: iddoc.into(),
            textdata: textdata.into(),
            state: state.into(),
            year: year.into(),
        }
    }

    /// Whether the document carries no usable text
    pub fn is_empty_text(&self) -> bool {
        self.textdata.trim().is_empty()
    }

    /// Copy of this document with different text (used when exploding chunks)
    pub fn with_text(&self, textdata: impl Into<String>) -> Self {
        Self {
            textdata: textdata.into(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert!(CaseDocument::new("1", "  \n", "fl", "2020").is_empty_text());
        assert!(!CaseDocument::new("1", "revoked", "fl", "2020").is_empty_text());
    }

    #[test]
    fn test_with_text_keeps_metadata() {
        let doc = CaseDocument::new("7", "long text", "fl", "2019");
        let chunk = doc.with_text("long");
        assert_eq!(chunk.iddoc, "7");
        assert_eq!(chunk.state, "fl");
        assert_eq!(chunk.year, "2019");
        assert_eq!(chunk.textdata, "long");
    }
}
