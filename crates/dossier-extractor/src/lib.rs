//! Dossier Extractor
//!
//! Turns entities and documents into model requests, and model output back
//! into typed records.
//!
//! # Overview
//!
//! Everything embedded in a prompt passes through a [`TokenBudgeter`] first, so
//! no request outgrows the model's context window. Prompt builders are pure
//! string formatting; parsers classify malformed output as a [`ParseError`]
//! instead of failing the stage.
//!
//! # Architecture
//!
//! ```text
//! EntityRecord → PromptBuilder → (LLM) → ResponseParser → EntityFields
//! CaseDocument → TokenBudgeter → ClassificationPromptBuilder → (LLM) → ViolationJudgments
//! ```
//!
//! # Example Usage
//!
//! ```
//! use dossier_extractor::{CharTokenizer, TokenBudgeter};
//!
//! let budgeter = TokenBudgeter::new(CharTokenizer);
//! assert_eq!(budgeter.truncate("hello world", 5).unwrap(), "hello");
//! assert_eq!(budgeter.chunk("abcdef", 4).unwrap(), vec!["abcd", "ef"]);
//! ```

#![warn(missing_docs)]

mod budget;
mod config;
mod error;
mod parser;
mod program;
mod prompt;
mod tokenizer;

pub use budget::TokenBudgeter;
pub use config::{BudgetConfig, ALLOWED_CHUNK_SIZES};
pub use error::{BudgetError, ExtractorError, TokenizerError};
pub use parser::{
    base_fields, parse_biography, parse_classification, parse_summary, ParseError,
    BIOGRAPHY_FIELDS,
};
pub use program::{ClassificationProgram, Demo};
pub use prompt::{
    extract_context, BiographyPromptBuilder, BirthYearPromptBuilder, ClassificationPromptBuilder,
    SummaryPromptBuilder,
};
pub use tokenizer::{AnyTokenizer, CharTokenizer, HfTokenizer};
