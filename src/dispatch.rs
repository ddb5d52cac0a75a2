//! Fan-out/fan-in execution of per-item processors.
//!
//! [`parallel_map`] runs one blocking worker per input item and rejoins the results in input
//! order. Each worker owns a copy of its item and reports `(index, value)` back to a single
//! collector, which is the only writer of the output vector.

use thiserror::Error;
use tokio::task::JoinSet;

/// Errors raised when a worker does not run to completion.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A worker panicked or was cancelled before producing its result.
    #[error("worker task failed: {0}")]
    WorkerFailed(#[from] tokio::task::JoinError),
}

/// Apply `processor` to every item concurrently and return the results in input order.
///
/// The output has the same length as `items` and `output[i] == processor(i, &items[i])`.
/// Slots start at `T::default()` and are overwritten by exactly one worker each. The call
/// returns only after every worker has finished. An empty input returns immediately without
/// spawning anything.
///
/// Processors are expected to be total; if one panics anyway the remaining workers are
/// aborted and the failure is returned instead of a partially filled vector.
pub async fn parallel_map<T, F>(items: &[String], processor: F) -> Result<Vec<T>, DispatchError>
where
    T: Default + Send + 'static,
    F: Fn(usize, &str) -> T + Copy + Send + 'static,
{
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let mut workers = JoinSet::new();
    for (index, item) in items.iter().enumerate() {
        let item = item.clone();
        workers.spawn_blocking(move || (index, processor(index, &item)));
    }

    let mut slots: Vec<T> = std::iter::repeat_with(T::default)
        .take(items.len())
        .collect();
    while let Some(joined) = workers.join_next().await {
        let (index, value) = joined?;
        slots[index] = value;
    }

    tracing::trace!(items = slots.len(), "All workers finished");
    Ok(slots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Barrier, LazyLock};
    use std::time::Duration;

    fn batch(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn empty_input_returns_empty_output() {
        let output: Vec<usize> = parallel_map(&[], |_, item: &str| item.len())
            .await
            .expect("dispatch");
        assert!(output.is_empty());
    }

    #[tokio::test]
    async fn results_follow_input_order() {
        let items = batch(&["a", "bbb", "cc", "", "dddd"]);
        let output = parallel_map(&items, |_, item: &str| item.len())
            .await
            .expect("dispatch");
        assert_eq!(output, vec![1, 3, 2, 0, 4]);
    }

    #[tokio::test]
    async fn order_survives_out_of_order_completion() {
        // Earlier items sleep longer, so they finish last.
        let items = batch(&["30", "20", "10", "0"]);
        let output = parallel_map(&items, |index, item: &str| {
            let millis: u64 = item.parse().unwrap_or(0);
            std::thread::sleep(Duration::from_millis(millis));
            format!("{index}:{item}")
        })
        .await
        .expect("dispatch");
        assert_eq!(output, vec!["0:30", "1:20", "2:10", "3:0"]);
    }

    #[tokio::test]
    async fn processor_receives_each_index_once() {
        let items = batch(&["x"; 64]);
        let output = parallel_map(&items, |index, _: &str| index)
            .await
            .expect("dispatch");
        assert_eq!(output, (0..64).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn panicking_worker_surfaces_as_error() {
        let items = batch(&["ok", "boom", "ok"]);
        let result = parallel_map(&items, |_, item: &str| {
            if item == "boom" {
                panic!("processor failure");
            }
            true
        })
        .await;
        assert!(matches!(result, Err(DispatchError::WorkerFailed(_))));
    }

    #[tokio::test]
    async fn workers_run_at_the_same_time() {
        const WORKERS: usize = 8;
        // Each worker blocks until all of them have arrived, so a sequential run never returns.
        static RENDEZVOUS: LazyLock<Barrier> = LazyLock::new(|| Barrier::new(WORKERS));

        let items = batch(&["x"; WORKERS]);
        let dispatch = parallel_map(&items, |index, _: &str| {
            RENDEZVOUS.wait();
            index
        });
        let output = tokio::time::timeout(Duration::from_secs(10), dispatch)
            .await
            .expect("workers did not all run concurrently")
            .expect("dispatch");
        assert_eq!(output, (0..WORKERS).collect::<Vec<_>>());
    }
}
