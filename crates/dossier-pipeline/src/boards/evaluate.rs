//! Agreement between hand-coded and model classifications

use crate::boards::TEXT_COLUMN;
use crate::error::Result;
use crate::output::Table;
use serde::Serialize;
use tracing::warn;

/// Labels compared, in matrix order
pub const EVALUATION_LABELS: [&str; 3] = ["1", "0", "-1"];

/// Columns that identify a document rather than answer a question
const IDENTITY_COLUMNS: [&str; 4] = ["iddoc", "textdata", "year", "state"];

/// Counts of true label (rows) against predicted label (columns)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    /// Question the matrix is for
    pub field: String,

    /// `counts[t][p]`, indexed like [`EVALUATION_LABELS`]
    pub counts: [[usize; 3]; 3],
}

impl ConfusionMatrix {
    /// Pairs where both labels agree
    pub fn correct(&self) -> usize {
        (0..3).map(|i| self.counts[i][i]).sum()
    }

    /// Pairs counted
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }
}

/// Result of comparing two classification tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    /// One matrix per question, in truth-table column order
    pub matrices: Vec<ConfusionMatrix>,

    /// Rows compared after dropping documents without text
    pub rows: usize,

    /// Cells where truth and prediction are identical
    pub agreement: usize,
}

/// Compare `pred` to `truth`
///
/// Rows without text are dropped from each table separately, then rows are
/// paired by position. Every non-identity column of `truth` is a question
/// and must be present in `pred`. Values are compared as strings after
/// `1.0`-style numbers are written as integers; pairs outside
/// [`EVALUATION_LABELS`] are left out of the matrices but still count
/// toward agreement when equal.
pub fn evaluate(truth: &Table, pred: &Table) -> Result<Evaluation> {
    let fields: Vec<&String> = truth
        .headers()
        .iter()
        .filter(|h| !IDENTITY_COLUMNS.contains(&h.as_str()))
        .collect();
    let truth_cols = fields
        .iter()
        .map(|f| truth.column(f))
        .collect::<Result<Vec<_>>>()?;
    let pred_cols = fields
        .iter()
        .map(|f| pred.column(f))
        .collect::<Result<Vec<_>>>()?;

    let truth_rows = rows_with_text(truth);
    let pred_rows = rows_with_text(pred);
    if truth_rows.len() != pred_rows.len() {
        warn!(
            truth = truth_rows.len(),
            pred = pred_rows.len(),
            "tables differ in length; comparing the common prefix"
        );
    }

    let mut matrices: Vec<ConfusionMatrix> = fields
        .iter()
        .map(|f| ConfusionMatrix {
            field: f.to_string(),
            counts: [[0; 3]; 3],
        })
        .collect();
    let mut agreement = 0;
    let mut rows = 0;

    for (&t_row, &p_row) in truth_rows.iter().zip(&pred_rows) {
        rows += 1;
        for (i, matrix) in matrices.iter_mut().enumerate() {
            let t = normalize(truth.cell(t_row, truth_cols[i]));
            let p = normalize(pred.cell(p_row, pred_cols[i]));
            if t == p {
                agreement += 1;
            }
            if let (Some(ti), Some(pi)) = (label_index(&t), label_index(&p)) {
                matrix.counts[ti][pi] += 1;
            }
        }
    }

    Ok(Evaluation {
        matrices,
        rows,
        agreement,
    })
}

fn rows_with_text(table: &Table) -> Vec<usize> {
    match table.find(TEXT_COLUMN) {
        Some(col) => (0..table.len())
            .filter(|&r| !table.cell(r, col).trim().is_empty())
            .collect(),
        None => (0..table.len()).collect(),
    }
}

fn normalize(value: &str) -> String {
    let value = value.trim();
    match value.parse::<f64>() {
        Ok(n) if n.fract() == 0.0 && n.is_finite() => format!("{}", n as i64),
        _ => value.to_string(),
    }
}

fn label_index(value: &str) -> Option<usize> {
    EVALUATION_LABELS.iter().position(|l| *l == value)
}
