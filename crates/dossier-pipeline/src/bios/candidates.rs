//! Candidate selection from the source table

use crate::error::{PipelineError, Result};
use crate::output::Table;
use dossier_domain::{expand_state, Candidate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::Path;
use tracing::{info, warn};

const SOURCE_COLUMNS: [&str; 7] = ["first", "middle", "last", "suffix", "min_year", "sab", "candid"];

/// Which rows of the source table to research
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// `count` candidates with distinct full names, drawn at random
    Random {
        /// Candidates wanted
        count: usize,
        /// Seed for a reproducible draw
        seed: Option<u64>,
    },

    /// The first `count` rows
    Order {
        /// Candidates wanted
        count: usize,
    },

    /// Explicit zero-based data rows
    Rows(Vec<usize>),
}

impl Selection {
    fn validate(&self) -> Result<()> {
        match self {
            Selection::Random { count, .. } | Selection::Order { count } if *count == 0 => Err(
                PipelineError::InvalidParameter("candidate count must be at least 1".to_string()),
            ),
            Selection::Rows(rows) if rows.is_empty() => Err(PipelineError::InvalidParameter(
                "at least one row is required".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Read the candidates `selection` names from the source table
///
/// The state abbreviation is expanded to the full state name. A random draw
/// stops early, with a warning, when the table has fewer distinct names than
/// requested.
pub fn read_candidates(path: &Path, selection: &Selection) -> Result<Vec<Candidate>> {
    selection.validate()?;
    let table = Table::read(path)?;
    let cols = SOURCE_COLUMNS
        .iter()
        .map(|c| table.column(c))
        .collect::<Result<Vec<_>>>()?;

    let candidate_at = |row: usize| {
        let cell = |i: usize| table.cell(row, cols[i]);
        Candidate::from_parts(
            cell(0),
            cell(1),
            cell(2),
            cell(3),
            cell(4),
            &expand_state(cell(5)),
            cell(6),
        )
        .with_row(row)
    };

    let candidates: Vec<Candidate> = match selection {
        Selection::Order { count } => (0..table.len().min(*count)).map(candidate_at).collect(),
        Selection::Rows(rows) => {
            if let Some(bad) = rows.iter().find(|r| **r >= table.len()) {
                return Err(PipelineError::InvalidParameter(format!(
                    "row {} is out of range (table has {} rows)",
                    bad,
                    table.len()
                )));
            }
            rows.iter().map(|r| candidate_at(*r)).collect()
        }
        Selection::Random { count, seed } => {
            let mut order: Vec<usize> = (0..table.len()).collect();
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(*seed),
                None => StdRng::from_entropy(),
            };
            order.shuffle(&mut rng);

            let mut seen = HashSet::new();
            let mut picked = Vec::with_capacity(*count);
            for row in order {
                if picked.len() == *count {
                    break;
                }
                let candidate = candidate_at(row);
                if seen.insert(candidate.full_name.clone()) {
                    picked.push(candidate);
                }
            }
            if picked.len() < *count {
                warn!(
                    requested = count,
                    available = picked.len(),
                    "fewer distinct candidates than requested"
                );
            }
            picked
        }
    };

    info!(selected = candidates.len(), "read candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "first,middle,last,suffix,min_year,sab,candid\n\
             JANE,nan,DOE,nan,2016,VT,301\n\
             john,q,public,jr,2010,OH,302\n\
             jane,nan,doe,nan,2018,VT,303\n\
             ann,nan,lee,nan,2012, ut ,304\n",
        )
        .unwrap();
        file
    }

    #[test]
    fn test_order_selection() {
        let file = table();
        let c = read_candidates(file.path(), &Selection::Order { count: 2 }).unwrap();
        assert_eq!(c.len(), 2);
        assert_eq!(c[0].full_name, "jane doe");
        assert_eq!(c[0].state, "Vermont");
        assert_eq!(c[1].full_name, "john q public jr");
        assert_eq!(c[1].row, Some(1));
    }

    #[test]
    fn test_row_selection() {
        let file = table();
        let c = read_candidates(file.path(), &Selection::Rows(vec![3, 0])).unwrap();
        assert_eq!(c[0].candid, "304");
        assert_eq!(c[0].state, "Utah");
        assert_eq!(c[1].candid, "301");

        assert!(matches!(
            read_candidates(file.path(), &Selection::Rows(vec![4])),
            Err(PipelineError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_random_selection_is_unique_and_seeded() {
        let file = table();
        let selection = Selection::Random {
            count: 10,
            seed: Some(7),
        };
        let first = read_candidates(file.path(), &selection).unwrap();
        assert_eq!(first.len(), 3);
        let names: HashSet<_> = first.iter().map(|c| c.full_name.clone()).collect();
        assert_eq!(names.len(), 3);

        let again = read_candidates(file.path(), &selection).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_zero_count_rejected() {
        let file = table();
        assert!(read_candidates(file.path(), &Selection::Order { count: 0 }).is_err());
        assert!(read_candidates(file.path(), &Selection::Rows(vec![])).is_err());
    }
}
