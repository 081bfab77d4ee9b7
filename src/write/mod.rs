//! Bulk write execution with selective retry.
//!
//! Only transient store errors (timeouts, lost connections) are retried;
//! anything else ends the batch on the first attempt.

mod retry;

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures::FutureExt;
use tokio_retry::RetryIf;

use crate::buffer::Batch;
use crate::error_handling::StoreError;
use crate::storage::DocumentStore;

pub use retry::RetryPolicy;

/// Result of writing one batch, including the number of attempts made.
#[derive(Debug)]
pub struct WriteOutcome {
    /// `Ok(())` once the store accepted the batch, or the last error seen.
    pub result: Result<(), StoreError>,
    /// Calls made to the store for this batch (initial attempt included).
    pub attempts: u32,
}

/// Writes `batch` to `store`, retrying transient failures per `policy`.
///
/// Retry delays sleep the task running this future: a worker task in
/// background mode, the triggering task in inline mode. Attempts for one
/// batch are strictly sequential.
pub async fn write_with_retry<S>(
    store: &Arc<S>,
    batch: &Batch<S::Document>,
    policy: &RetryPolicy,
) -> WriteOutcome
where
    S: DocumentStore,
{
    let batch_id = batch.id();
    let max_attempts = policy.max_attempts;
    let attempt_count = Arc::new(AtomicU32::new(0));

    let result = RetryIf::spawn(
        policy.strategy(),
        {
            let store = Arc::clone(store);
            let documents = batch.shared();
            let attempt_count = Arc::clone(&attempt_count);
            move || {
                let attempt = attempt_count.fetch_add(1, Ordering::SeqCst) + 1;
                let store = Arc::clone(&store);
                let documents = Arc::clone(&documents);

                async move {
                    // A panicking store ends the batch like any fatal error
                    let result = AssertUnwindSafe(store.insert_many(&documents))
                        .catch_unwind()
                        .await
                        .unwrap_or_else(|_| {
                            Err(StoreError::Other(anyhow::anyhow!(
                                "store panicked while writing batch {}",
                                batch_id
                            )))
                        });
                    if let Err(ref e) = result {
                        if e.is_transient() && attempt < max_attempts {
                            log::warn!(
                                "Transient error writing batch {} (attempt {}/{}), retrying: {}",
                                batch_id,
                                attempt,
                                max_attempts,
                                e
                            );
                        }
                    }
                    result
                }
            }
        },
        |e: &StoreError| e.is_transient(),
    )
    .await;

    WriteOutcome {
        result,
        attempts: attempt_count.load(Ordering::SeqCst),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::buffer::WriteBuffer;
    use crate::storage::MemoryStore;

    fn batch_of(documents: Vec<u32>) -> Batch<u32> {
        let buffer = WriteBuffer::new(usize::MAX);
        buffer.extend(documents);
        buffer.take().expect("non-empty batch")
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let store = Arc::new(MemoryStore::<u32>::new());
        let policy = RetryPolicy::new(Duration::from_secs(10), 10);

        let outcome = write_with_retry(&store, &batch_of(vec![1, 2, 3]), &policy).await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.attempts, 1);
        assert_eq!(store.batches(), vec![vec![1, 2, 3]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried_with_fixed_delay() {
        let store = Arc::new(MemoryStore::<u32>::new());
        store.fail_next_with_timeouts(3);
        let policy = RetryPolicy::new(Duration::from_secs(10), 4);

        let outcome = write_with_retry(&store, &batch_of(vec![7]), &policy).await;

        assert!(outcome.result.is_ok());
        assert_eq!(outcome.attempts, 4);
        let times = store.call_times();
        assert_eq!(times.len(), 4);
        for pair in times.windows(2) {
            let delay = pair[1] - pair[0];
            // The paused clock rounds timer deadlines up to the millisecond
            assert!(delay >= Duration::from_secs(10), "delay {:?}", delay);
            assert!(delay < Duration::from_millis(10_010), "delay {:?}", delay);
        }
        assert_eq!(store.batches(), vec![vec![7]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_exhaust_after_max_attempts() {
        let store = Arc::new(MemoryStore::<u32>::new());
        store.fail_next_with_timeouts(5);
        let policy = RetryPolicy::new(Duration::from_secs(1), 3);

        let outcome = write_with_retry(&store, &batch_of(vec![1]), &policy).await;

        assert!(matches!(outcome.result, Err(StoreError::NetworkTimeout(_))));
        assert_eq!(outcome.attempts, 3);
        assert_eq!(store.call_count(), 3);
        assert!(store.batches().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_is_not_retried() {
        let store = Arc::new(MemoryStore::<u32>::new());
        store.fail_next(StoreError::Rejected("document too large".into()));
        let policy = RetryPolicy::new(Duration::from_secs(1), 10);

        let start = tokio::time::Instant::now();
        let outcome = write_with_retry(&store, &batch_of(vec![1]), &policy).await;

        assert!(matches!(outcome.result, Err(StoreError::Rejected(_))));
        assert_eq!(outcome.attempts, 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_after_transient_stops_retrying() {
        let store = Arc::new(MemoryStore::<u32>::new());
        store.fail_next_with_timeouts(1);
        store.fail_next(StoreError::Rejected("schema violation".into()));
        let policy = RetryPolicy::new(Duration::from_secs(1), 10);

        let outcome = write_with_retry(&store, &batch_of(vec![1]), &policy).await;

        assert!(matches!(outcome.result, Err(StoreError::Rejected(_))));
        assert_eq!(outcome.attempts, 2);
    }

    struct PanickingStore;

    #[async_trait::async_trait]
    impl DocumentStore for PanickingStore {
        type Document = u32;

        async fn insert_many(&self, _documents: &[u32]) -> Result<(), StoreError> {
            panic!("driver bug");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_panic_is_a_fatal_error() {
        let store = Arc::new(PanickingStore);
        let policy = RetryPolicy::new(Duration::from_secs(1), 10);

        let outcome = write_with_retry(&store, &batch_of(vec![1]), &policy).await;

        assert!(matches!(outcome.result, Err(StoreError::Other(_))));
        assert_eq!(outcome.attempts, 1);
    }
}
