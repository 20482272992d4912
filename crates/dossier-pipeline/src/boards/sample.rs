//! Reproducible document samples

use crate::error::{PipelineError, Result};
use crate::output::Table;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;
use tracing::{debug, info};

/// Sample sizes offered for drawing documents
pub const SAMPLE_SIZES: [usize; 8] = [1, 2, 5, 10, 20, 25, 50, 100];

/// Draw `count` rows without replacement using `seed` (0 to 9)
///
/// Rows come back unchanged, in draw order, together with their indices.
pub fn sample_documents(table: &Table, count: usize, seed: u64) -> Result<(Table, Vec<usize>)> {
    if seed > 9 {
        return Err(PipelineError::InvalidParameter(format!(
            "seed must be between 0 and 9 (got {})",
            seed
        )));
    }
    if !SAMPLE_SIZES.contains(&count) {
        return Err(PipelineError::InvalidParameter(format!(
            "sample size must be one of {:?} (got {})",
            SAMPLE_SIZES, count
        )));
    }
    if count > table.len() {
        return Err(PipelineError::InvalidParameter(format!(
            "cannot draw {} of {} documents",
            count,
            table.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let indices = index::sample(&mut rng, table.len(), count).into_vec();
    debug!(?indices, "sample indices");

    let rows = indices.iter().map(|&i| table.rows()[i].clone()).collect();
    info!(count, seed, "sampled documents");
    Ok((Table::from_rows(table.headers().to_vec(), rows), indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boards::fixtures;
    use std::collections::HashSet;

    fn corpus(n: usize) -> Table {
        let rows: Vec<(String, String)> = (0..n).map(|i| (i.to_string(), format!("case {}", i))).collect();
        let refs: Vec<(&str, &str)> = rows.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        fixtures::table(&refs)
    }

    #[test]
    fn test_same_seed_same_sample() {
        let table = corpus(40);
        let (_, a) = sample_documents(&table, 10, 3).unwrap();
        let (_, b) = sample_documents(&table, 10, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_sample_without_replacement() {
        let table = corpus(30);
        let (sample, indices) = sample_documents(&table, 25, 0).unwrap();
        assert_eq!(sample.len(), 25);
        assert_eq!(indices.iter().collect::<HashSet<_>>().len(), 25);
        assert_eq!(sample.rows()[0], table.rows()[indices[0]]);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let table = corpus(5);
        assert!(sample_documents(&table, 3, 0).is_err());
        assert!(sample_documents(&table, 2, 10).is_err());
        assert!(sample_documents(&table, 10, 1).is_err());
    }
}
