//! State medical board case documents
//!
//! Every operation reads and writes document tables (`iddoc`, `textdata`,
//! `state`, `year`, plus whatever columns earlier steps added) and leaves
//! the columns it does not own untouched.

mod chunk;
mod classify;
mod evaluate;
mod sample;
mod summarize;
mod tokens;

pub use chunk::chunk_documents;
pub use classify::{
    classify_documents, classify_table, Classification, EMPTY_LABEL, FAILED_LABEL,
};
pub use evaluate::{evaluate, ConfusionMatrix, Evaluation, EVALUATION_LABELS};
pub use sample::{sample_documents, SAMPLE_SIZES};
pub use summarize::{summarize_documents, summarize_table, SUMMARY_COLUMN, SUMMARY_FAILED};
pub use tokens::{token_report, TokenReport};

use crate::error::Result;
use crate::output::Table;
use dossier_domain::CaseDocument;

/// Column holding the case text
pub const TEXT_COLUMN: &str = "textdata";

/// Read one document per table row
///
/// `iddoc` and `textdata` are required; `state` and `year` default to
/// empty.
pub fn documents(table: &Table) -> Result<Vec<CaseDocument>> {
    let id = table.column("iddoc")?;
    let text = table.column(TEXT_COLUMN)?;
    let state = table.find("state");
    let year = table.find("year");
    let optional = |row: usize, col: Option<usize>| col.map_or("", |c| table.cell(row, c));

    Ok((0..table.len())
        .map(|row| {
            CaseDocument::new(
                table.cell(row, id),
                table.cell(row, text),
                optional(row, state),
                optional(row, year),
            )
        })
        .collect())
}

/// Copy of `table` with `columns` set from `values`, one row of values per
/// table row
///
/// Existing columns of the same name are overwritten; new ones are appended.
pub(crate) fn with_columns(table: &Table, columns: &[&str], values: Vec<Vec<String>>) -> Table {
    let mut headers = table.headers().to_vec();
    let positions: Vec<usize> = columns
        .iter()
        .map(|name| match headers.iter().position(|h| h == name) {
            Some(pos) => pos,
            None => {
                headers.push(name.to_string());
                headers.len() - 1
            }
        })
        .collect();

    let rows = table
        .rows()
        .iter()
        .zip(values)
        .map(|(row, new)| {
            let mut row = row.clone();
            row.resize(headers.len(), String::new());
            for (pos, value) in positions.iter().zip(new) {
                row[*pos] = value;
            }
            row
        })
        .collect();
    Table::from_rows(headers, rows)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_from_table() {
        let docs = documents(&fixtures::table(&[("a", "revoked"), ("b", "")])).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0], CaseDocument::new("a", "revoked", "FL", "2019"));
        assert!(docs[1].is_empty_text());
    }

    #[test]
    fn test_documents_require_text() {
        let table = Table::from_rows(vec!["iddoc".into()], vec![vec!["a".into()]]);
        assert!(documents(&table).is_err());
    }

    #[test]
    fn test_with_columns_appends_and_overwrites() {
        let table = fixtures::table(&[("a", "x")]);
        let out = with_columns(&table, &["year", "label"], vec![vec!["2020".into(), "1".into()]]);
        assert_eq!(out.headers().len(), 5);
        assert_eq!(out.cell(0, 3), "2020");
        assert_eq!(out.cell(0, 4), "1");
    }
}
