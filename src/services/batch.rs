use std::future::Future;
use std::time::Duration;

use futures::future::join_all;

use crate::error::{AppError, AppResult};

/// Batching parameters for outgoing upstream lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    /// Maximum lookups in flight at once. Zero is treated as one.
    pub batch_size: usize,
    /// Pause between two consecutive batches
    pub delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            delay: Duration::from_millis(500),
        }
    }
}

/// Runs `fetch` for every item, `batch_size` at a time.
///
/// Each batch is awaited as a whole (every lookup settles, failures do not
/// cancel siblings) before the next one starts, and consecutive batches are
/// spaced by `delay`. The returned vector has one entry per item, in input
/// order.
pub async fn fetch_batched<I, T, F, Fut>(
    items: &[I],
    config: BatchConfig,
    fetch: F,
) -> Vec<AppResult<T>>
where
    F: Fn(&I) -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let batch_size = config.batch_size.max(1);
    let batch_count = items.len().div_ceil(batch_size);
    let mut results = Vec::with_capacity(items.len());

    for (index, batch) in items.chunks(batch_size).enumerate() {
        tracing::debug!(
            batch = index + 1,
            batches = batch_count,
            size = batch.len(),
            "Fetching batch"
        );

        let settled = join_all(batch.iter().map(&fetch)).await;

        for (offset, result) in settled.iter().enumerate() {
            if let Err(e) = result {
                tracing::warn!(
                    item = index * batch_size + offset,
                    error = %e,
                    "Batch item failed"
                );
            }
        }
        results.extend(settled);

        if index + 1 < batch_count && !config.delay.is_zero() {
            tokio::time::sleep(config.delay).await;
        }
    }

    results
}

/// Keeps the successful results, dropping failed items
pub fn successes<T>(results: Vec<AppResult<T>>) -> Vec<T> {
    results.into_iter().filter_map(Result::ok).collect()
}

/// Pairs every item with its result, replacing failures with `fallback(item)`
pub fn with_fallback<I, T, U>(
    items: &[I],
    results: Vec<Result<T, AppError>>,
    merge: impl Fn(&I, T) -> U,
    fallback: impl Fn(&I) -> U,
) -> Vec<U> {
    items
        .iter()
        .zip(results)
        .map(|(item, result)| match result {
            Ok(value) => merge(item, value),
            Err(_) => fallback(item),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_input_order() {
        let items: Vec<u64> = (1..=12).collect();

        let results = fetch_batched(&items, BatchConfig::default(), |n| {
            let n = *n;
            async move {
                // Later items finish first within a batch
                tokio::time::sleep(Duration::from_millis(100 - n)).await;
                Ok(n * 10)
            }
        })
        .await;

        let values: Vec<u64> = successes(results);
        assert_eq!(values, (1..=12).map(|n| n * 10).collect::<Vec<_>>());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrency_never_exceeds_batch_size() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let items: Vec<usize> = (0..13).collect();

        let config = BatchConfig {
            batch_size: 4,
            delay: Duration::from_millis(500),
        };

        let results = fetch_batched(&items, config, |_| {
            let in_flight = in_flight.clone();
            let peak = peak.clone();
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

        assert_eq!(results.len(), 13);
        assert_eq!(peak.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_batches_are_spaced_by_delay() {
        let started = Instant::now();
        let items: Vec<usize> = (0..11).collect();

        fetch_batched(&items, BatchConfig::default(), |_| async { Ok(()) }).await;

        // 11 items in batches of 5 -> 3 batches -> 2 pauses
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(started.elapsed() < Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_batch_does_not_wait() {
        let started = Instant::now();
        let items = vec![1, 2, 3];

        fetch_batched(&items, BatchConfig::default(), |_| async { Ok(()) }).await;

        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_item_does_not_affect_siblings() {
        let items = vec![1, 2, 3, 4, 5];

        let results = fetch_batched(&items, BatchConfig::default(), |n| {
            let n = *n;
            async move {
                if n == 3 {
                    Err(AppError::Internal("lookup failed".to_string()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(results.len(), 5);
        assert!(results[2].is_err());
        assert_eq!(successes(results), vec![1, 2, 4, 5]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let items: Vec<u32> = Vec::new();
        let results = fetch_batched(&items, BatchConfig::default(), |n| {
            let n = *n;
            async move { Ok(n) }
        })
        .await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_with_fallback_replaces_failures() {
        let items = vec!["a", "b", "c"];
        let results = vec![
            Ok(1),
            Err(AppError::Internal("down".to_string())),
            Ok(3),
        ];

        let merged = with_fallback(
            &items,
            results,
            |item, n| format!("{item}{n}"),
            |item| item.to_string(),
        );

        assert_eq!(merged, vec!["a1", "b", "c3"]);
    }
}
