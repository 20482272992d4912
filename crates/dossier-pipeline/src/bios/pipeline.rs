//! The biography pipeline: search, retrieve, extract

use crate::bios::candidates::Selection;
use crate::bios::extract::{extract_responses, ExtractionOutcome};
use crate::bios::records::read_searched;
use crate::bios::retrieve::{retrieve_entities, RetrievalOutcome};
use crate::bios::search::{search_stage, SearchOutcome};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::output::{OutputFiles, WriteMode, EXTRACTIONS};
use dossier_domain::{EntityRecord, EntityStatus, LlmProvider, PromptRecord, SearchProvider};
use dossier_fetch::{PageFetcher, SourceFetcher};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Counts and timings of a full run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GatherReport {
    /// Candidates read from the source table
    pub candidates: usize,
    /// Candidates rejected before their search
    pub rejected: usize,
    /// Entities that reached `Searched`
    pub searched: usize,
    /// Prompts built from scraped context
    pub prompts: usize,
    /// Scrapes that timed out
    pub scrape_timeouts: usize,
    /// Scrapes that failed
    pub scrape_errors: usize,
    /// Biographies parsed
    pub parsed: usize,
    /// Model calls that failed
    pub service_errors: usize,
    /// Responses that did not decode
    pub parse_errors: usize,
    /// Seconds spent searching
    pub search_secs: f64,
    /// Seconds spent scraping and building prompts
    pub retrieve_secs: f64,
    /// Seconds spent waiting on the model
    pub extract_secs: f64,
    /// Seconds for the whole run
    pub total_secs: f64,
}

/// Runs the biography stages against injected collaborators
///
/// Retry policies are the caller's choice: wrap the search and model
/// providers in [`Retrying`](dossier_executor::Retrying) before handing them
/// over.
pub struct BiographyPipeline<S, P, L> {
    config: PipelineConfig,
    files: OutputFiles,
    search: S,
    fetcher: SourceFetcher<P>,
    llm: Arc<L>,
}

impl<S, P, L> BiographyPipeline<S, P, L>
where
    S: SearchProvider,
    P: PageFetcher + 'static,
    L: LlmProvider + 'static,
{
    /// Validate `config` and assemble the pipeline
    pub fn new(config: PipelineConfig, search: S, pages: P, llm: L) -> Result<Self> {
        config.validate()?;
        let files = OutputFiles::new(&config.output_dir);
        let fetcher = SourceFetcher::new(pages, config.fetch.clone());
        Ok(Self {
            config,
            files,
            search,
            fetcher,
            llm: Arc::new(llm),
        })
    }

    /// The configuration in use
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The stage files
    pub fn files(&self) -> &OutputFiles {
        &self.files
    }

    /// Run every stage for the selected candidates
    ///
    /// Files from a previous run are removed first. Each stage writes its
    /// partitions before the next one starts.
    pub async fn gather(&self, selection: &Selection) -> Result<GatherReport> {
        let started = Instant::now();
        self.files.reset()?;

        let mut report = GatherReport::default();
        let stage = Instant::now();
        let searched = self.search(selection).await?;
        report.candidates = searched.submitted();
        report.rejected = searched.rejected.len();
        report.searched = searched
            .entities
            .iter()
            .filter(|e| e.status() == EntityStatus::Searched)
            .count();
        report.search_secs = stage.elapsed().as_secs_f64();

        let stage = Instant::now();
        let retrieval = self.run_retrieval(searched.entities).await?;
        report.prompts = retrieval.prompts.len();
        report.scrape_timeouts = retrieval.timeouts.len();
        report.scrape_errors = retrieval.errors.len();
        report.retrieve_secs = stage.elapsed().as_secs_f64();

        let stage = Instant::now();
        let extraction = self.run_extraction(retrieval.prompts).await?;
        report.parsed = extraction.count(EntityStatus::Parsed);
        report.service_errors = extraction.count(EntityStatus::ServiceError);
        report.parse_errors = extraction.count(EntityStatus::ParseError);
        report.extract_secs = stage.elapsed().as_secs_f64();

        report.total_secs = started.elapsed().as_secs_f64();
        info!(
            candidates = report.candidates,
            parsed = report.parsed,
            "biography run finished in {:.2}s",
            report.total_secs
        );
        Ok(report)
    }

    /// Read candidates, search for each, and write `searches.csv`
    pub async fn search(&self, selection: &Selection) -> Result<SearchOutcome> {
        search_stage(&self.search, &self.config, selection, &self.files).await
    }

    /// Scrape the entities in a search-layout file and write the partitions
    ///
    /// Accepts `searches.csv` or `scrape_timeouts.csv`, which share a layout.
    pub async fn retrieve(&self, input: &Path) -> Result<RetrievalOutcome> {
        let entities = read_searched(input)?;
        self.run_retrieval(entities).await
    }

    async fn run_retrieval(&self, entities: Vec<EntityRecord>) -> Result<RetrievalOutcome> {
        let outcome =
            retrieve_entities(&self.fetcher, entities, &self.config.executor, &self.files).await?;
        outcome.write(&self.files)?;
        Ok(outcome)
    }

    async fn run_extraction(
        &self,
        prompts: Vec<PromptRecord>,
    ) -> Result<ExtractionOutcome> {
        let outcome = extract_responses(Arc::clone(&self.llm), prompts, &self.files, "extract").await?;
        outcome.write(&self.files, EXTRACTIONS, WriteMode::Overwrite, WriteMode::Overwrite)?;
        Ok(outcome)
    }
}
