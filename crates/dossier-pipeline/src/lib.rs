//! Dossier Pipelines
//!
//! The two data-collection workflows built on the lower crates.
//!
//! # Biographies
//!
//! [`bios::BiographyPipeline`] researches political candidates in three
//! stages. Each stage partitions its input so that every record lands in
//! exactly one output file, and each per-item failure is also appended to
//! `errors.txt`:
//!
//! 1. **Search**: one query per candidate, run serially with a pause
//!    between calls
//! 2. **Retrieve**: sources scraped in sequential batches with a per-item
//!    timeout, then rendered into prompts
//! 3. **Extract**: prompts sent to the model all at once and the answers
//!    decoded
//!
//! # Case documents
//!
//! [`boards`] samples, chunks, classifies, summarizes and scores
//! medical-board case documents.
//!
//! # Example
//!
//! ```
//! use dossier_pipeline::{OutputFiles, PipelineConfig};
//!
//! let config = PipelineConfig::default();
//! assert!(config.validate().is_ok());
//! let files = OutputFiles::new(&config.output_dir);
//! assert!(files.path("searches.csv").ends_with("searches.csv"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bios;
pub mod boards;
mod config;
mod error;
pub mod output;

pub use config::{LlmConfig, PipelineConfig, SearchConfig};
pub use error::{PipelineError, Result};
pub use output::{combine_csv, OutputFiles, Table, WriteMode};
