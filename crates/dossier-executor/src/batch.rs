//! Sequential batches of concurrent, individually timed work

use crate::config::ExecutorConfig;
use crate::error::ExecutorError;
use crate::metrics::{BatchMetrics, BatchTiming};
use crate::outcome::{BatchOutcome, FailureCause, ItemFailure};
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

/// Run `worker` over `items` in sequential batches
///
/// Items are split into batches of `config.batch_size`. A batch's items run
/// concurrently as tokio tasks, optionally bounded by
/// `config.max_concurrency`; the next batch starts only once every item of
/// the current one has settled. Each item gets `config.per_item_timeout()`
/// from the moment it starts running; on expiry its future is dropped and
/// the item is placed in `timeouts`. Worker errors and panics go to
/// `failures`. Nothing in one item can cancel another.
///
/// When `config.timeout_retry_rounds > 0`, the items that timed out are fed
/// through a fresh run, up to that many times.
///
/// # Errors
///
/// Returns [`ExecutorError::InvalidParameter`] before doing any work if the
/// configuration is invalid.
pub async fn run_batches<T, R, E, F, Fut>(
    items: Vec<T>,
    config: &ExecutorConfig,
    worker: F,
) -> Result<BatchOutcome<T, R, E>, ExecutorError>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    config.validate()?;
    let worker = Arc::new(worker);

    let mut outcome = run_round(items, config, &worker).await;
    for round in 1..=config.timeout_retry_rounds {
        if outcome.timeouts.is_empty() {
            break;
        }
        let retry = std::mem::take(&mut outcome.timeouts);
        info!(round, items = retry.len(), "re-running timed-out items");
        let next = run_round(retry, config, &worker).await;
        outcome.successes.extend(next.successes);
        outcome.failures.extend(next.failures);
        outcome.timeouts = next.timeouts;
        outcome.metrics.absorb(next.metrics);
    }

    info!(
        successes = outcome.successes.len(),
        timeouts = outcome.timeouts.len(),
        failures = outcome.failures.len(),
        "run complete"
    );
    Ok(outcome)
}

async fn run_round<T, R, E, F, Fut>(
    items: Vec<T>,
    config: &ExecutorConfig,
    worker: &Arc<F>,
) -> BatchOutcome<T, R, E>
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let mut outcome = BatchOutcome::empty();
    let timeout = config.per_item_timeout();
    let total_batches = items.len().div_ceil(config.batch_size);

    let mut remaining = items.into_iter().peekable();
    let mut index = 0;
    while remaining.peek().is_some() {
        let batch: Vec<T> = remaining.by_ref().take(config.batch_size).collect();
        let timing = run_batch(
            index,
            batch,
            timeout,
            config.max_concurrency,
            worker,
            &mut outcome,
        )
        .await;
        info!(
            "Finished batch {}/{} in {:.2}s",
            index + 1,
            total_batches,
            timing.elapsed.as_secs_f64()
        );
        outcome.metrics.record_batch(timing);
        index += 1;
    }
    outcome
}

async fn run_batch<T, R, E, F, Fut>(
    index: usize,
    batch: Vec<T>,
    timeout: Duration,
    max_concurrency: Option<usize>,
    worker: &Arc<F>,
    outcome: &mut BatchOutcome<T, R, E>,
) -> BatchTiming
where
    T: Clone + Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let started = Instant::now();
    let size = batch.len();
    let limit = max_concurrency.map(|n| Arc::new(Semaphore::new(n)));

    let mut handles = Vec::with_capacity(size);
    for item in batch {
        let worker = Arc::clone(worker);
        let limit = limit.clone();
        let input = item.clone();
        let handle = tokio::spawn(async move {
            let _permit = match limit {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };
            tokio::time::timeout(timeout, worker(input)).await
        });
        handles.push((item, handle));
    }

    let (mut ok, mut timed_out, mut failed) = (0, 0, 0);
    for (item, handle) in handles {
        match handle.await {
            Ok(Ok(Ok(result))) => {
                ok += 1;
                outcome.successes.push(result);
            }
            Ok(Ok(Err(e))) => {
                failed += 1;
                debug!(batch = index, "worker returned an error");
                outcome.failures.push(ItemFailure {
                    item,
                    cause: FailureCause::Error(e),
                });
            }
            Ok(Err(_elapsed)) => {
                timed_out += 1;
                warn!(batch = index, timeout_secs = timeout.as_secs_f64(), "item timed out");
                outcome.timeouts.push(item);
            }
            Err(join_error) => {
                failed += 1;
                let message = panic_message(join_error);
                warn!(batch = index, error = %message, "worker task did not complete");
                outcome.failures.push(ItemFailure {
                    item,
                    cause: FailureCause::Panicked(message),
                });
            }
        }
    }

    BatchTiming {
        index,
        size,
        elapsed: started.elapsed(),
        successes: ok,
        timeouts: timed_out,
        failures: failed,
    }
}

fn panic_message(error: JoinError) -> String {
    if error.is_cancelled() {
        return "task was cancelled".to_string();
    }
    payload_message(error.into_panic())
}

pub(crate) fn payload_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn config(batch_size: usize, timeout_secs: f64) -> ExecutorConfig {
        ExecutorConfig {
            batch_size,
            per_item_timeout_secs: timeout_secs,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_successes_keep_submission_order() {
        let outcome: BatchOutcome<u64, u64, String> =
            run_batches((0..10).collect(), &config(4, 5.0), |n| async move {
                tokio::time::sleep(Duration::from_millis(20 - 2 * n)).await;
                Ok(n)
            })
            .await
            .unwrap();

        assert_eq!(outcome.successes, (0..10).collect::<Vec<_>>());
        assert_eq!(outcome.metrics.total_batches(), 3);
        assert_eq!(outcome.metrics.batches()[2].size, 2);
    }

    #[tokio::test]
    async fn test_partitions_are_disjoint() {
        let outcome = run_batches((0..9u32).collect(), &config(3, 0.2), |n| async move {
            match n % 3 {
                0 => Ok(n),
                1 => Err(format!("bad {}", n)),
                _ => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.successes, vec![0, 3, 6]);
        assert_eq!(outcome.timeouts, vec![2, 5, 8]);
        let failed: Vec<u32> = outcome.failures.iter().map(|f| f.item).collect();
        assert_eq!(failed, vec![1, 4, 7]);
        assert_eq!(outcome.failures[0].cause, FailureCause::Error("bad 1".into()));
        assert_eq!(outcome.total(), 9);
    }

    #[tokio::test]
    async fn test_always_timeout_worker() {
        let outcome: BatchOutcome<&str, (), ()> =
            run_batches(vec!["slow"], &config(10, 0.05), |_| async {
                std::future::pending::<()>().await;
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(outcome.timeouts, vec!["slow"]);
        assert!(outcome.successes.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_panic_is_captured() {
        let outcome: BatchOutcome<u8, u8, ()> =
            run_batches(vec![1, 2], &config(2, 1.0), |n| async move {
                if n == 2 {
                    panic!("cannot handle two");
                }
                Ok(n)
            })
            .await
            .unwrap();

        assert_eq!(outcome.successes, vec![1]);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(
            outcome.failures[0].cause,
            FailureCause::Panicked("cannot handle two".into())
        );
    }

    #[tokio::test]
    async fn test_invalid_parameters_fail_before_work() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<BatchOutcome<u8, u8, ()>, _> =
            run_batches(vec![1], &config(0, 1.0), move |n| {
                counter.fetch_add(1, Ordering::SeqCst);
                async move { Ok(n) }
            })
            .await;

        assert!(matches!(result, Err(ExecutorError::InvalidParameter(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let result: Result<BatchOutcome<u8, u8, ()>, _> =
            run_batches(vec![1], &config(1, 0.0), |n| async move { Ok(n) }).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_input() {
        let outcome: BatchOutcome<u8, u8, ()> =
            run_batches(Vec::new(), &config(5, 1.0), |n| async move { Ok(n) })
                .await
                .unwrap();
        assert_eq!(outcome.total(), 0);
        assert_eq!(outcome.metrics.total_batches(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_bound() {
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (r, p) = (Arc::clone(&running), Arc::clone(&peak));
        let config = ExecutorConfig {
            batch_size: 8,
            per_item_timeout_secs: 5.0,
            max_concurrency: Some(2),
            ..Default::default()
        };

        let outcome: BatchOutcome<u8, u8, ()> = run_batches((0..8).collect(), &config, move |n| {
            let (running, peak) = (Arc::clone(&r), Arc::clone(&p));
            async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                Ok(n)
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.successes.len(), 8);
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_timeout_retry_rounds() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let config = ExecutorConfig {
            batch_size: 4,
            per_item_timeout_secs: 0.1,
            timeout_retry_rounds: 2,
            ..Default::default()
        };

        // Slow on the first call only.
        let outcome: BatchOutcome<u8, u8, ()> = run_batches(vec![7], &config, move |n| {
            let first = counter.fetch_add(1, Ordering::SeqCst) == 0;
            async move {
                if first {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
                Ok(n)
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.successes, vec![7]);
        assert!(outcome.timeouts.is_empty());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(outcome.metrics.total_batches(), 2);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        /// Property: every item lands in exactly one partition
        #[test]
        fn test_exhaustive_accounting(
            kinds in proptest::collection::vec(0u8..3, 0..40),
            batch_size in 1usize..8,
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let items: Vec<(usize, u8)> = kinds.into_iter().enumerate().collect();
            let config = ExecutorConfig {
                batch_size,
                per_item_timeout_secs: 0.02,
                ..Default::default()
            };

            let outcome = runtime
                .block_on(run_batches(items.clone(), &config, |(id, kind)| async move {
                    match kind {
                        0 => Ok(id),
                        1 => Err(id),
                        _ => {
                            tokio::time::sleep(Duration::from_secs(1)).await;
                            Ok(id)
                        }
                    }
                }))
                .unwrap();

            let mut seen = BTreeSet::new();
            for id in &outcome.successes {
                prop_assert!(seen.insert(*id));
            }
            for (id, _) in &outcome.timeouts {
                prop_assert!(seen.insert(*id));
            }
            for failure in &outcome.failures {
                prop_assert!(seen.insert(failure.item.0));
            }
            prop_assert_eq!(seen.len(), items.len());
            prop_assert_eq!(outcome.timeouts.iter().filter(|(_, k)| *k != 2).count(), 0);
        }
    }
}
