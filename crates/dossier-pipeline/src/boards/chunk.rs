//! Splitting long case text into token-bounded pieces

use crate::boards::{with_columns, TEXT_COLUMN};
use crate::error::{PipelineError, Result};
use crate::output::Table;
use dossier_domain::Tokenizer;
use dossier_extractor::{TokenBudgeter, TokenizerError, ALLOWED_CHUNK_SIZES};
use tracing::info;

/// Replace each document's text by its chunks, one row per chunk
///
/// The other columns are copied onto every piece. A document with no text
/// keeps a single row with empty text.
pub fn chunk_documents<T>(
    table: &Table,
    budgeter: &TokenBudgeter<T>,
    chunk_size: usize,
) -> Result<Table>
where
    T: Tokenizer,
    T::Error: Into<TokenizerError>,
{
    if !ALLOWED_CHUNK_SIZES.contains(&chunk_size) {
        return Err(PipelineError::InvalidParameter(format!(
            "chunk size must be one of {:?} (got {})",
            ALLOWED_CHUNK_SIZES, chunk_size
        )));
    }
    let text = table.column(TEXT_COLUMN)?;

    let mut exploded = Vec::new();
    for (row, cells) in table.rows().iter().enumerate() {
        let mut pieces = budgeter.chunk(table.cell(row, text), chunk_size)?;
        if pieces.is_empty() {
            pieces.push(String::new());
        }
        exploded.extend(pieces.into_iter().map(|piece| (cells.clone(), piece)));
    }

    let (rows, pieces): (Vec<_>, Vec<_>) = exploded.into_iter().unzip();
    let base = Table::from_rows(table.headers().to_vec(), rows);
    let chunked = with_columns(
        &base,
        &[TEXT_COLUMN],
        pieces.into_iter().map(|p| vec![p]).collect(),
    );
    info!(documents = table.len(), chunks = chunked.len(), chunk_size, "chunked documents");
    Ok(chunked)
}
