//! Candidate biography collection
//!
//! Stages hand off through CSV files in the output directory, so any stage
//! can be run on its own against the files of an earlier run.
//!
//! ```text
//! source table → search → searches.csv
//!              → retrieve → retrievals.csv | scrape_timeouts.csv | scrape_errors.csv
//!              → extract → extractions.csv | service_errors.csv | parse_errors.csv
//! service_errors.csv → rerun → reruns.csv
//! retrievals.csv → birth years → birth_years.csv
//! ```

mod birth_years;
mod candidates;
mod extract;
mod pipeline;
pub mod records;
mod rerun;
mod retrieve;
mod search;

pub use birth_years::{birth_years, BirthYear};
pub use candidates::{read_candidates, Selection};
pub use extract::{extract_responses, ExtractionOutcome};
pub use pipeline::{BiographyPipeline, GatherReport};
pub use rerun::{rerun_service_errors, RerunAttempt};
pub use retrieve::{retrieve_entities, RetrievalOutcome};
pub use search::{search_candidates, search_stage, SearchOutcome};
