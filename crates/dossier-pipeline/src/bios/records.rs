//! Row layouts of the biography stage files

use crate::error::{PipelineError, Result};
use crate::output::{format_sources, parse_sources, Table};
use dossier_domain::{
    Candidate, DomainError, EntityFields, EntityRecord, EntityStatus, PromptRecord,
    SourceReference, MISSING_MARKER,
};
use dossier_extractor::extract_context;
use std::path::Path;

/// Columns of `searches.csv` and `scrape_timeouts.csv`
pub const SEARCH_COLUMNS: [&str; 8] = [
    "Sources", "First", "Middle", "Last", "Full", "Min Year", "State", "Candid",
];

/// Columns of `scrape_errors.csv`
pub const SCRAPE_ERROR_COLUMNS: [&str; 9] = [
    "Sources", "First", "Middle", "Last", "Full", "Min Year", "State", "Candid", "Error",
];

/// Columns of `retrievals.csv`
pub const RETRIEVAL_COLUMNS: [&str; 6] = [
    "ChatGPT Prompt",
    "Sources",
    "Full Name",
    "Min Year",
    "State",
    "Candid",
];

/// Columns of `service_errors.csv`
pub const SERVICE_ERROR_COLUMNS: [&str; 7] = [
    "ChatGPT Prompt",
    "Sources",
    "Full Name",
    "Min Year",
    "State",
    "Candid",
    "Error",
];

/// Columns of `extractions.csv` and `reruns.csv`
pub const EXTRACTION_COLUMNS: [&str; 10] = [
    "Name",
    "State",
    "Min Year",
    "Candid",
    "College Major",
    "Undergraduate Institution",
    "Highest Degree and Institution",
    "Work History",
    "Sources",
    "ChatGPT Confidence",
];

/// Columns of `parse_errors.csv`
pub const PARSE_ERROR_COLUMNS: [&str; 5] =
    ["Candid", "Full Name", "ChatGPT Prompt", "Raw Response", "Error"];

/// Columns of `birth_years.csv`
pub const BIRTH_YEAR_COLUMNS: [&str; 2] = ["Candid", "Birth Year"];

fn part(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| MISSING_MARKER.to_string())
}

/// Row of `searches.csv` for an entity
pub fn search_row(entity: &EntityRecord) -> Vec<String> {
    let c = &entity.candidate;
    vec![
        format_sources(&entity.source_urls()),
        part(&c.first),
        part(&c.middle),
        part(&c.last),
        c.full_name.clone(),
        c.min_year.clone(),
        c.state.clone(),
        c.candid.clone(),
    ]
}

/// Row of `scrape_errors.csv`
pub fn scrape_error_row(entity: &EntityRecord, error: &str) -> Vec<String> {
    let mut row = search_row(entity);
    row.push(error.to_string());
    row
}

/// Read entities at `Searched` from a file in the search layout
///
/// A row without a candidate id fails the whole read, naming the row.
pub fn read_searched(path: &Path) -> Result<Vec<EntityRecord>> {
    let table = Table::read(path)?;
    let cols = SEARCH_COLUMNS
        .iter()
        .map(|c| table.column(c))
        .collect::<Result<Vec<_>>>()?;

    let mut entities = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let cell = |i: usize| table.cell(row, cols[i]);
        let mut candidate =
            Candidate::from_parts(cell(1), cell(2), cell(3), "", cell(5), cell(6), cell(7));
        // The stored full name may include a suffix the parts do not.
        if !cell(4).trim().is_empty() {
            candidate.full_name = cell(4).trim().to_lowercase();
        }
        let sources = parse_sources(cell(0))
            .into_iter()
            .map(SourceReference::new)
            .collect();
        let entity =
            EntityRecord::at_stage(candidate, sources, String::new(), EntityStatus::Searched)
                .map_err(|e| invalid_row(path, row, e))?;
        entities.push(entity);
    }
    Ok(entities)
}

fn invalid_row(path: &Path, row: usize, error: DomainError) -> PipelineError {
    PipelineError::InvalidParameter(format!("{} row {}: {}", path.display(), row + 1, error))
}

/// Row of `retrievals.csv`
pub fn retrieval_row(prompt: &PromptRecord) -> Vec<String> {
    let c = &prompt.entity.candidate;
    vec![
        prompt.prompt.clone(),
        format_sources(&prompt.entity.source_urls()),
        c.full_name.clone(),
        c.min_year.clone(),
        c.state.clone(),
        c.candid.clone(),
    ]
}

/// Row of `service_errors.csv`
pub fn service_error_row(prompt: &PromptRecord, error: &str) -> Vec<String> {
    let mut row = retrieval_row(prompt);
    row.push(error.to_string());
    row
}

/// Read prompts at `Prompted` from a file in the retrieval layout
///
/// The entity context is recovered from the prompt text when possible. A
/// row without a candidate id fails the read like [`read_searched`].
pub fn read_prompts(path: &Path) -> Result<Vec<PromptRecord>> {
    let table = Table::read(path)?;
    let cols = RETRIEVAL_COLUMNS
        .iter()
        .map(|c| table.column(c))
        .collect::<Result<Vec<_>>>()?;

    let mut prompts = Vec::with_capacity(table.len());
    for row in 0..table.len() {
        let cell = |i: usize| table.cell(row, cols[i]);
        let prompt = cell(0).to_string();
        let candidate = Candidate::from_full_name(cell(2), cell(3), cell(4), cell(5));
        let sources = parse_sources(cell(1))
            .into_iter()
            .map(SourceReference::new)
            .collect();
        let context = extract_context(&prompt).unwrap_or_default().to_string();
        let entity = EntityRecord::at_stage(candidate, sources, context, EntityStatus::Prompted)
            .map_err(|e| invalid_row(path, row, e))?;
        prompts.push(PromptRecord::new(entity, prompt));
    }
    Ok(prompts)
}

/// Row of `extractions.csv`
///
/// Fields the model left out are written as empty cells.
pub fn extraction_row(fields: &EntityFields) -> Vec<String> {
    const KEYS: [&str; 10] = [
        "Full Name",
        "State",
        "Min Year",
        "Candid",
        "College Major",
        "Undergraduate Institution",
        "Highest Degree and Institution",
        "Work History",
        "Sources",
        "Confidence Level",
    ];
    KEYS.iter()
        .map(|k| fields.get_text(k).unwrap_or_default())
        .collect()
}

/// Row of `parse_errors.csv`
pub fn parse_error_row(prompt: &PromptRecord, raw_response: &str, error: &str) -> Vec<String> {
    let c = &prompt.entity.candidate;
    vec![
        c.candid.clone(),
        c.full_name.clone(),
        prompt.prompt.clone(),
        raw_response.to_string(),
        error.to_string(),
    ]
}

/// Short identity used in `errors.txt` entries
pub fn describe(entity: &EntityRecord) -> String {
    describe_candidate(&entity.candidate)
}

/// [`describe`] for a candidate that never became an entity
pub fn describe_candidate(candidate: &Candidate) -> String {
    format!(
        "{{'Full': '{}', 'State': '{}', 'Candid': '{}'}}",
        candidate.full_name, candidate.state, candidate.candid
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{write_table, WriteMode};
    use dossier_extractor::BiographyPromptBuilder;

    fn searched() -> EntityRecord {
        let c = Candidate::from_parts("jane", "nan", "doe", "jr", "2016", "Vermont", "301");
        let sources = vec![SourceReference::new("https://a"), SourceReference::new("")];
        EntityRecord::at_stage(c, sources, String::new(), EntityStatus::Searched).unwrap()
    }

    #[test]
    fn test_search_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("searches.csv");
        let entity = searched();
        write_table(&path, &SEARCH_COLUMNS, &[search_row(&entity)], WriteMode::Overwrite).unwrap();

        let read = read_searched(&path).unwrap();
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].candidate.full_name, "jane doe jr");
        assert_eq!(read[0].candidate.middle, None);
        assert_eq!(read[0].source_urls(), vec!["https://a", ""]);
        assert_eq!(read[0].status(), EntityStatus::Searched);
    }

    #[test]
    fn test_search_row_uses_missing_marker() {
        let row = search_row(&searched());
        assert_eq!(row[0], r#"["https://a",""]"#);
        assert_eq!(row[2], "nan");
    }

    #[test]
    fn test_row_without_id_fails_the_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("searches.csv");
        std::fs::write(
            &path,
            "Sources,First,Middle,Last,Full,Min Year,State,Candid\n\
             ['x'],c,nan,d,c d,2001,Utah,7\n\
             ['x'],a,nan,b,a b,2000,Ohio,\n",
        )
        .unwrap();
        let err = read_searched(&path).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidParameter(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_prompt_rows_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retrievals.csv");
        let mut entity = searched();
        entity.context = "doe taught school".into();
        let prompt = PromptRecord::new(entity.clone(), BiographyPromptBuilder::new().build(&entity));
        write_table(&path, &RETRIEVAL_COLUMNS, &[retrieval_row(&prompt)], WriteMode::Overwrite)
            .unwrap();

        let read = read_prompts(&path).unwrap();
        assert_eq!(read[0].prompt, prompt.prompt);
        assert_eq!(read[0].entity.context, "doe taught school");
        assert_eq!(read[0].entity.id().as_str(), "301");
        assert_eq!(read[0].entity.status(), EntityStatus::Prompted);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retrievals.csv");
        std::fs::write(&path, "Sources,Candid\n[],1\n").unwrap();
        assert!(read_prompts(&path).is_err());
    }

    #[test]
    fn test_extraction_row_order() {
        let mut fields = EntityFields::new();
        fields.insert("Full Name", "jane doe");
        fields.insert("Confidence Level", 90);
        let row = extraction_row(&fields);
        assert_eq!(row.len(), EXTRACTION_COLUMNS.len());
        assert_eq!(row[0], "jane doe");
        assert_eq!(row[4], "");
        assert_eq!(row[9], "90");
    }
}
