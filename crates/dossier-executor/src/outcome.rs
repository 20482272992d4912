//! Result partitions of a batched or fanned-out run

use crate::metrics::BatchMetrics;
use std::fmt;

/// Why an item failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause<E> {
    /// The worker returned an error
    Error(E),

    /// The worker panicked; holds the panic message
    Panicked(String),
}

impl<E: fmt::Display> fmt::Display for FailureCause<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(e) => write!(f, "{}", e),
            FailureCause::Panicked(msg) => write!(f, "worker panicked: {}", msg),
        }
    }
}

/// An item whose worker did not succeed, with the cause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure<T, E> {
    /// The input item, as submitted
    pub item: T,

    /// What went wrong
    pub cause: FailureCause<E>,
}

/// Disjoint partitions of a run
///
/// Every submitted item is accounted for exactly once across the three
/// buckets.
#[derive(Debug)]
pub struct BatchOutcome<T, R, E> {
    /// Worker results, in submission order within each batch
    pub successes: Vec<R>,

    /// Items whose worker exceeded the per-item timeout
    pub timeouts: Vec<T>,

    /// Items whose worker returned an error or panicked
    pub failures: Vec<ItemFailure<T, E>>,

    /// Timing and counts per batch
    pub metrics: BatchMetrics,
}

impl<T, R, E> BatchOutcome<T, R, E> {
    pub(crate) fn empty() -> Self {
        Self {
            successes: Vec::new(),
            timeouts: Vec::new(),
            failures: Vec::new(),
            metrics: BatchMetrics::new(),
        }
    }

    /// Number of items accounted for
    pub fn total(&self) -> usize {
        self.successes.len() + self.timeouts.len() + self.failures.len()
    }

    /// Whether every item succeeded
    pub fn is_clean(&self) -> bool {
        self.timeouts.is_empty() && self.failures.is_empty()
    }
}

impl<T, R, E> Default for BatchOutcome<T, R, E> {
    fn default() -> Self {
        Self::empty()
    }
}
