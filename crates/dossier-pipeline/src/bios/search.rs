//! Search stage: candidate -> entity with source URLs

use crate::bios::candidates::{read_candidates, Selection};
use crate::bios::records::{describe, describe_candidate, search_row, SEARCH_COLUMNS};
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::output::{write_table, OutputFiles, WriteMode, SEARCHES};
use dossier_domain::{Candidate, EntityRecord, EntityStatus, SearchProvider, SourceReference};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Entities produced by the search stage
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Entities at `Searched`, in input order
    pub entities: Vec<EntityRecord>,

    /// Candidates that could not become an entity, with the cause
    pub rejected: Vec<(Candidate, String)>,
}

impl SearchOutcome {
    /// Number of candidates the stage was given
    pub fn submitted(&self) -> usize {
        self.entities.len() + self.rejected.len()
    }
}

/// Find up to `results_per_query` source URLs for each candidate
///
/// Searches run one at a time with `delay` between them. A search that
/// returns nothing, or that fails after the provider's own retries, leaves
/// the entity with a single empty URL; failures are also written to the
/// error log. A candidate without an id is rejected before its search and
/// logged the same way.
pub async fn search_candidates<S: SearchProvider>(
    provider: &S,
    candidates: Vec<Candidate>,
    results_per_query: u8,
    delay: Duration,
    files: &OutputFiles,
) -> Result<SearchOutcome> {
    if !(1..=4).contains(&results_per_query) {
        return Err(PipelineError::InvalidParameter(format!(
            "results per query must be between 1 and 4 (got {})",
            results_per_query
        )));
    }

    let started = Instant::now();
    let total = candidates.len();
    let mut outcome = SearchOutcome {
        entities: Vec::with_capacity(total),
        rejected: Vec::new(),
    };

    for (index, candidate) in candidates.into_iter().enumerate() {
        let query = candidate.search_query();
        let mut entity = match EntityRecord::new(candidate.clone()) {
            Ok(entity) => entity,
            Err(e) => {
                warn!(index, error = %e, "rejecting candidate");
                let cause = e.to_string();
                files.log_error(&describe_candidate(&candidate), "search", "googleSearch", &cause);
                outcome.rejected.push((candidate, cause));
                continue;
            }
        };
        if !outcome.entities.is_empty() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let urls = match provider.search(&query, results_per_query).await {
            Ok(urls) if !urls.is_empty() => urls,
            Ok(_) => vec![String::new()],
            Err(e) => {
                warn!(query = %query, error = %e, "search failed");
                files.log_error(&describe(&entity), "search", "googleSearch", &e.to_string());
                vec![String::new()]
            }
        };
        debug!(index, query = %query, results = urls.len(), "searched");

        entity.sources = urls.into_iter().map(SourceReference::new).collect();
        entity.advance(EntityStatus::Searched)?;
        outcome.entities.push(entity);
    }

    info!(
        candidates = total,
        rejected = outcome.rejected.len(),
        "search finished in {:.2}s",
        started.elapsed().as_secs_f64()
    );
    Ok(outcome)
}

/// Read the selected candidates, search for each, and write `searches.csv`
///
/// Explicit row selections use the shorter row delay.
pub async fn search_stage<S: SearchProvider>(
    provider: &S,
    config: &PipelineConfig,
    selection: &Selection,
    files: &OutputFiles,
) -> Result<SearchOutcome> {
    let candidates = read_candidates(&config.source_table, selection)?;
    let delay = match selection {
        Selection::Rows(_) => config.search.row_delay(),
        _ => config.search.delay(),
    };
    let outcome = search_candidates(
        provider,
        candidates,
        config.search.results_per_query,
        delay,
        files,
    )
    .await?;

    let rows: Vec<_> = outcome.entities.iter().map(search_row).collect();
    write_table(&files.path(SEARCHES), &SEARCH_COLUMNS, &rows, WriteMode::Overwrite)?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dossier_fetch::{MockSearchProvider, SearchError};

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::from_parts("jane", "nan", "doe", "", "2016", "Vermont", "1"),
            Candidate::from_parts("john", "nan", "roe", "", "2010", "Ohio", "2"),
            Candidate::from_parts("ann", "nan", "lee", "", "2012", "Utah", "3"),
        ]
    }

    #[tokio::test]
    async fn test_search_stage() {
        let dir = tempfile::tempdir().unwrap();
        let files = OutputFiles::new(dir.path());
        let provider = MockSearchProvider::new();
        provider.add_results(
            "Jane Doe Vermont",
            vec!["https://a".into(), "https://b".into(), "https://c".into()],
        );
        provider.add_error("Ann Lee Utah", SearchError::RateLimitExceeded);

        let entities = search_candidates(&provider, candidates(), 2, Duration::ZERO, &files)
            .await
            .unwrap()
            .entities;

        assert_eq!(entities.len(), 3);
        assert_eq!(entities[0].source_urls(), vec!["https://a", "https://b"]);
        assert_eq!(entities[1].source_urls(), vec![""]);
        assert_eq!(entities[2].source_urls(), vec![""]);
        assert!(entities.iter().all(|e| e.status() == EntityStatus::Searched));

        let log = std::fs::read_to_string(files.path(crate::output::ERROR_LOG)).unwrap();
        assert!(log.contains("search - googleSearch generated an exception"));
    }

    #[tokio::test]
    async fn test_candidate_without_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let files = OutputFiles::new(dir.path());
        let provider = MockSearchProvider::new();
        let input = vec![
            Candidate::from_parts("jane", "nan", "doe", "", "2016", "Vermont", "1"),
            Candidate::from_parts("john", "nan", "roe", "", "2010", "Ohio", ""),
        ];

        let outcome = search_candidates(&provider, input, 2, Duration::ZERO, &files)
            .await
            .unwrap();

        assert_eq!(outcome.submitted(), 2);
        assert_eq!(outcome.entities.len() + outcome.rejected.len(), 2);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].0.full_name, "john roe");
        assert_eq!(provider.call_count(), 1);

        let log = std::fs::read_to_string(files.path(crate::output::ERROR_LOG)).unwrap();
        assert!(log.contains("'Candid': ''} search - googleSearch generated an exception"));
    }

    #[tokio::test]
    async fn test_unwritable_error_log_keeps_entities() {
        let dir = tempfile::tempdir().unwrap();
        let files = OutputFiles::new(dir.path());
        std::fs::create_dir(files.path(crate::output::ERROR_LOG)).unwrap();
        let provider = MockSearchProvider::new();
        provider.add_error("Ann Lee Utah", SearchError::RateLimitExceeded);

        let outcome = search_candidates(&provider, candidates(), 1, Duration::ZERO, &files)
            .await
            .unwrap();
        assert_eq!(outcome.entities.len(), 3);
    }

    #[tokio::test]
    async fn test_result_count_range() {
        let dir = tempfile::tempdir().unwrap();
        let files = OutputFiles::new(dir.path());
        let provider = MockSearchProvider::new();
        for r in [0u8, 5] {
            assert!(matches!(
                search_candidates(&provider, candidates(), r, Duration::ZERO, &files).await,
                Err(PipelineError::InvalidParameter(_))
            ));
        }
        assert_eq!(provider.call_count(), 0);
    }
}
