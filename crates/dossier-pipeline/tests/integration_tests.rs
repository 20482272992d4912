//! End-to-end runs of the biography pipeline against mock collaborators
//!
//! Each test writes a small candidate table to a temporary directory, runs
//! every stage, and checks the partitions that land on disk.

use dossier_domain::EntityStatus;
use dossier_fetch::{MockPageFetcher, MockSearchProvider};
use dossier_llm::MockProvider;
use dossier_pipeline::bios::{BiographyPipeline, Selection};
use dossier_pipeline::output::{
    ERROR_LOG, EXTRACTIONS, PARSE_ERRORS, RETRIEVALS, SCRAPE_TIMEOUTS, SEARCHES, SERVICE_ERRORS,
};
use dossier_pipeline::{PipelineConfig, Table};
use std::path::Path;

const COMPLETE_RESPONSE: &str = r#"{"College Major": "Political Science", "Undergraduate Institution": "State U", "Highest Degree and Institution": "BA, State U", "Work History": "Farmer", "Confidence Level": 90}"#;

const PEOPLE: [(&str, &str, &str); 5] = [
    ("jane", "doe", "1"),
    ("john", "roe", "2"),
    ("ann", "lee", "3"),
    ("bo", "kim", "4"),
    ("cy", "fox", "5"),
];

fn write_candidates(path: &Path, count: usize) {
    let mut text = String::from("first,middle,last,suffix,min_year,sab,candid\n");
    for (first, last, candid) in PEOPLE.iter().take(count) {
        text.push_str(&format!("{},,{},,2016,VT,{}\n", first, last, candid));
    }
    std::fs::write(path, text).unwrap();
}

fn config(dir: &Path, count: usize) -> PipelineConfig {
    let table = dir.join("candidates.csv");
    write_candidates(&table, count);

    let mut config = PipelineConfig::default();
    config.output_dir = dir.join("out");
    config.source_table = table;
    config.search.delay_ms = 0;
    config.search.row_delay_ms = 0;
    config.executor.per_item_timeout_secs = 0.5;
    config
}

fn url(candid: &str) -> String {
    format!("https://example.com/{}", candid)
}

/// Search results and pages for every candidate
fn collaborators(count: usize) -> (MockSearchProvider, MockPageFetcher) {
    let search = MockSearchProvider::new();
    let pages = MockPageFetcher::new();
    for (first, last, candid) in PEOPLE.iter().take(count) {
        let query = format!("{} {} Vermont", title(first), title(last));
        search.add_results(query, vec![url(candid)]);
        pages.add_page(
            url(candid),
            format!(
                "<html><body><p>{} {} studied law.</p><script>var x = 1;</script></body></html>",
                title(first),
                title(last)
            ),
        );
    }
    (search, pages)
}

fn title(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[tokio::test]
async fn test_all_entities_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 3);
    let (search, pages) = collaborators(3);
    let llm = MockProvider::new(COMPLETE_RESPONSE);
    let pipeline = BiographyPipeline::new(config, search, pages, llm.clone()).unwrap();

    let report = pipeline.gather(&Selection::Order { count: 3 }).await.unwrap();

    assert_eq!(report.candidates, 3);
    assert_eq!(report.parsed, 3);
    assert_eq!(report.scrape_timeouts, 0);
    assert_eq!(report.scrape_errors, 0);
    assert_eq!(report.service_errors, 0);
    assert_eq!(report.parse_errors, 0);
    assert_eq!(llm.call_count(), 3);

    let files = pipeline.files();
    assert_eq!(Table::read(files.path(SEARCHES)).unwrap().len(), 3);
    assert_eq!(Table::read(files.path(RETRIEVALS)).unwrap().len(), 3);
    assert!(Table::read(files.path(SCRAPE_TIMEOUTS)).unwrap().is_empty());
    assert!(Table::read(files.path(SERVICE_ERRORS)).unwrap().is_empty());
    assert!(Table::read(files.path(PARSE_ERRORS)).unwrap().is_empty());

    let extractions = Table::read(files.path(EXTRACTIONS)).unwrap();
    assert_eq!(extractions.len(), 3);
    let major = extractions.column("College Major").unwrap();
    let confidence = extractions.column("ChatGPT Confidence").unwrap();
    for row in 0..extractions.len() {
        assert_eq!(extractions.cell(row, major), "Political Science");
        assert_eq!(extractions.cell(row, confidence), "90");
    }

    let retrievals = Table::read(files.path(RETRIEVALS)).unwrap();
    let prompt = retrievals.column("ChatGPT Prompt").unwrap();
    for row in 0..retrievals.len() {
        assert!(retrievals.cell(row, prompt).contains("studied law."));
        assert!(!retrievals.cell(row, prompt).contains("var x"));
    }
}

#[tokio::test]
async fn test_one_hanging_source_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config(dir.path(), 5);
    config.executor.batch_size = 2;
    let (search, pages) = collaborators(5);
    pages.add_hang(url("3"));
    let pipeline =
        BiographyPipeline::new(config, search, pages, MockProvider::new(COMPLETE_RESPONSE))
            .unwrap();

    let report = pipeline.gather(&Selection::Order { count: 5 }).await.unwrap();

    assert_eq!(report.scrape_timeouts, 1);
    assert_eq!(report.prompts, 4);
    assert_eq!(report.parsed, 4);
    assert_eq!(report.prompts + report.scrape_timeouts + report.scrape_errors, 5);

    let files = pipeline.files();
    let timeouts = Table::read(files.path(SCRAPE_TIMEOUTS)).unwrap();
    assert_eq!(timeouts.len(), 1);
    let candid = timeouts.column("Candid").unwrap();
    assert_eq!(timeouts.cell(0, candid), "3");

    let log = std::fs::read_to_string(files.path(ERROR_LOG)).unwrap();
    assert_eq!(log.matches("TimeoutError").count(), 1);

    // The timed-out entity can be retried from its own file.
    let retry = pipeline.retrieve(&files.path(SCRAPE_TIMEOUTS)).await.unwrap();
    assert_eq!(retry.timeouts.len(), 1);
    assert_eq!(retry.timeouts[0].status(), EntityStatus::ScrapeTimeout);
}

#[tokio::test]
async fn test_non_json_response_is_kept_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 2);
    let (search, pages) = collaborators(2);
    let raw = "I'm sorry, I can't find that.\nCollege Major: unknown, \"maybe\" history";
    let pipeline = BiographyPipeline::new(config, search, pages, MockProvider::new(raw)).unwrap();

    let report = pipeline.gather(&Selection::Order { count: 2 }).await.unwrap();
    assert_eq!(report.parse_errors, 2);
    assert_eq!(report.parsed, 0);

    let files = pipeline.files();
    let parse_errors = Table::read(files.path(PARSE_ERRORS)).unwrap();
    assert_eq!(parse_errors.len(), 2);
    let col = parse_errors.column("Raw Response").unwrap();
    for row in 0..parse_errors.len() {
        assert_eq!(parse_errors.cell(row, col), raw);
    }
    assert!(Table::read(files.path(EXTRACTIONS)).unwrap().is_empty());
}

#[tokio::test]
async fn test_rows_selection_searches_listed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), 5);
    let (search, pages) = collaborators(5);
    let pipeline = BiographyPipeline::new(
        config,
        search.clone(),
        pages,
        MockProvider::new(COMPLETE_RESPONSE),
    )
    .unwrap();

    let outcome = pipeline.search(&Selection::Rows(vec![1, 4])).await.unwrap();
    let ids: Vec<&str> = outcome.entities.iter().map(|e| e.id().as_str()).collect();
    assert!(outcome.rejected.is_empty());
    assert_eq!(ids, ["2", "5"]);
    assert_eq!(search.call_count(), 2);
}
