//! In-memory document store.
//!
//! Keeps every bulk write it receives, which makes it useful both as a test
//! double and as a zero-setup target for benchmarks. Latency and failures can
//! be simulated.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::{Document, DocumentStore};
use crate::error_handling::StoreError;

struct MemoryState<D> {
    batches: Vec<Vec<D>>,
    failures: VecDeque<StoreError>,
    calls: Vec<Instant>,
}

/// Document store backed by a `Vec` of written batches.
pub struct MemoryStore<D = Document> {
    latency: Duration,
    state: Mutex<MemoryState<D>>,
}

impl<D> MemoryStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    /// Creates a store that answers immediately.
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Creates a store that waits `latency` before answering each call.
    pub fn with_latency(latency: Duration) -> Self {
        MemoryStore {
            latency,
            state: Mutex::new(MemoryState {
                batches: Vec::new(),
                failures: VecDeque::new(),
                calls: Vec::new(),
            }),
        }
    }

    /// Queues an error to be returned by the next call that has not already
    /// been assigned one. Failed calls write nothing.
    pub fn fail_next(&self, error: StoreError) {
        self.lock().failures.push_back(error);
    }

    /// Queues `count` network timeouts.
    pub fn fail_next_with_timeouts(&self, count: usize) {
        let mut state = self.lock();
        for attempt in 0..count {
            state.failures.push_back(StoreError::NetworkTimeout(format!(
                "simulated timeout #{}",
                attempt + 1
            )));
        }
    }

    /// Successfully written batches, in write order.
    pub fn batches(&self) -> Vec<Vec<D>> {
        self.lock().batches.clone()
    }

    /// All successfully written documents, flattened.
    pub fn documents(&self) -> Vec<D> {
        self.lock().batches.iter().flatten().cloned().collect()
    }

    /// Number of `insert_many` calls, failed ones included.
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Instant at which each `insert_many` call started.
    pub fn call_times(&self) -> Vec<Instant> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D> Default for MemoryStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<D> DocumentStore for MemoryStore<D>
where
    D: Clone + Send + Sync + 'static,
{
    type Document = D;

    async fn insert_many(&self, documents: &[D]) -> Result<(), StoreError> {
        let failure = {
            let mut state = self.lock();
            state.calls.push(Instant::now());
            state.failures.pop_front()
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if let Some(error) = failure {
            return Err(error);
        }

        self.lock().batches.push(documents.to_vec());
        Ok(())
    }
}
