//! Dossier Domain Layer
//!
//! Core vocabulary shared by both collection pipelines: the records that flow
//! through each stage, the status machine they obey, and the trait boundaries
//! to the outside world (search, language models, tokenizers).
//!
//! ## Key Concepts
//!
//! - **Entity**: a candidate or case document processed end to end
//! - **Status**: a monotonic tag recording how far an entity has progressed
//! - **Source reference**: one external document consulted for an entity
//! - **Prompt / response records**: the request sent to a model and what came back
//! - **Violation**: one of the yes/no/unsure questions asked of a case document
//!
//! ## Architecture
//!
//! This crate holds no I/O. Infrastructure implementations live in the
//! `dossier-llm`, `dossier-fetch` and `dossier-extractor` crates and are
//! reached only through the traits in [`traits`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod candidate;
pub mod document;
pub mod entity;
pub mod error;
pub mod record;
pub mod source;
pub mod state;
pub mod traits;
pub mod violation;

// Re-exports for convenience
pub use candidate::{name_part, title_case, Candidate, MISSING_MARKER};
pub use document::CaseDocument;
pub use entity::{EntityId, EntityRecord, EntityStatus};
pub use error::DomainError;
pub use record::{EntityFields, PromptRecord, ResponseRecord};
pub use source::{is_missing_url, ContentKind, Extraction, SourceReference};
pub use state::{expand_state, STATES};
pub use traits::{ChatMessage, ChatRequest, LlmProvider, Role, SearchProvider, Tokenizer};
pub use violation::{Judgment, Violation, ViolationJudgments};
