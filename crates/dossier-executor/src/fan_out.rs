//! Unbounded fan-out

use crate::batch::payload_message;
use crate::metrics::BatchTiming;
use crate::outcome::{BatchOutcome, FailureCause, ItemFailure};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Run `worker` over every item at once and collect results as they finish
///
/// There is no batch bound and no timeout; any bound on in-flight calls
/// belongs to the worker (a rate-limited client, for instance). Successes
/// are in completion order. Errors and panics are recorded against their
/// item.
pub async fn fan_out<T, R, E, F, Fut>(items: Vec<T>, worker: F) -> BatchOutcome<T, R, E>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let started = Instant::now();
    let size = items.len();
    let mut outcome = BatchOutcome::empty();

    let mut set = JoinSet::new();
    let mut pending: Vec<Option<T>> = Vec::with_capacity(size);
    for (idx, item) in items.into_iter().enumerate() {
        let future = worker(item.clone());
        pending.push(Some(item));
        set.spawn(async move { (idx, AssertUnwindSafe(future).catch_unwind().await) });
    }

    while let Some(joined) = set.join_next().await {
        let (idx, result) = match joined {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "fan-out task did not complete");
                continue;
            }
        };
        let Some(item) = pending.get_mut(idx).and_then(Option::take) else {
            continue;
        };
        match result {
            Ok(Ok(value)) => outcome.successes.push(value),
            Ok(Err(e)) => outcome.failures.push(ItemFailure {
                item,
                cause: FailureCause::Error(e),
            }),
            Err(payload) => {
                let message = payload_message(payload);
                warn!(error = %message, "fan-out worker panicked");
                outcome.failures.push(ItemFailure {
                    item,
                    cause: FailureCause::Panicked(message),
                });
            }
        }
    }

    // Anything still pending belonged to a task that never reported back.
    for item in pending.into_iter().flatten() {
        outcome.failures.push(ItemFailure {
            item,
            cause: FailureCause::Panicked("task was cancelled".to_string()),
        });
    }

    let elapsed = started.elapsed();
    info!(
        items = size,
        failures = outcome.failures.len(),
        "fan-out finished in {:.2}s",
        elapsed.as_secs_f64()
    );
    outcome.metrics.record_batch(BatchTiming {
        index: 0,
        size,
        elapsed,
        successes: outcome.successes.len(),
        timeouts: 0,
        failures: outcome.failures.len(),
    });
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_results_in_completion_order() {
        let outcome: BatchOutcome<u64, u64, ()> = fan_out(vec![30, 10, 20], |ms| async move {
            tokio::time::sleep(Duration::from_millis(ms)).await;
            Ok(ms)
        })
        .await;

        assert_eq!(outcome.successes, vec![10, 20, 30]);
        assert!(outcome.timeouts.is_empty());
    }

    #[tokio::test]
    async fn test_errors_and_panics_are_accounted() {
        let outcome = fan_out(vec![1u8, 2, 3], |n| async move {
            match n {
                1 => Ok(n),
                2 => Err("refused"),
                _ => panic!("three"),
            }
        })
        .await;

        assert_eq!(outcome.successes, vec![1]);
        assert_eq!(outcome.total(), 3);
        let mut causes: Vec<String> = outcome
            .failures
            .iter()
            .map(|f| f.cause.to_string())
            .collect();
        causes.sort();
        assert_eq!(causes, vec!["refused", "worker panicked: three"]);
        assert_eq!(outcome.metrics.total_batches(), 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let outcome: BatchOutcome<u8, u8, ()> = fan_out(vec![], |n| async move { Ok(n) }).await;
        assert_eq!(outcome.total(), 0);
    }
}
