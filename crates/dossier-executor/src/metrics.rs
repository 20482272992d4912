//! Per-batch timing and counts

use std::time::Duration;

/// Timing and counts for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchTiming {
    /// Zero-based batch index within the run
    pub index: usize,

    /// Items submitted in the batch
    pub size: usize,

    /// Wall time from first spawn to last join
    pub elapsed: Duration,

    /// Items that succeeded
    pub successes: usize,

    /// Items that timed out
    pub timeouts: usize,

    /// Items that failed or panicked
    pub failures: usize,
}

/// Metrics collected over a run
#[derive(Debug, Clone, Default)]
pub struct BatchMetrics {
    batches: Vec<BatchTiming>,
}

impl BatchMetrics {
    /// Create empty metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed batch
    pub fn record_batch(&mut self, timing: BatchTiming) {
        self.batches.push(timing);
    }

    /// Append the batches of another run, renumbering them after ours
    pub fn absorb(&mut self, other: BatchMetrics) {
        let offset = self.batches.len();
        for mut timing in other.batches {
            timing.index += offset;
            self.batches.push(timing);
        }
    }

    /// Recorded batches, in execution order
    pub fn batches(&self) -> &[BatchTiming] {
        &self.batches
    }

    /// Number of batches run
    pub fn total_batches(&self) -> usize {
        self.batches.len()
    }

    /// Sum of batch wall times
    pub fn total_elapsed(&self) -> Duration {
        self.batches.iter().map(|b| b.elapsed).sum()
    }

    /// Total successes
    pub fn total_successes(&self) -> usize {
        self.batches.iter().map(|b| b.successes).sum()
    }

    /// Total timeouts
    pub fn total_timeouts(&self) -> usize {
        self.batches.iter().map(|b| b.timeouts).sum()
    }

    /// Total failures
    pub fn total_failures(&self) -> usize {
        self.batches.iter().map(|b| b.failures).sum()
    }

    /// Human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "{} batches in {:.2}s: {} ok, {} timed out, {} failed",
            self.total_batches(),
            self.total_elapsed().as_secs_f64(),
            self.total_successes(),
            self.total_timeouts(),
            self.total_failures()
        )];
        for b in &self.batches {
            lines.push(format!(
                "  batch {} ({} items): {:.2}s",
                b.index + 1,
                b.size,
                b.elapsed.as_secs_f64()
            ));
        }
        lines.join("\n")
    }
}
