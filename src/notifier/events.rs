//! Flush outcome events delivered to subscribers.

use std::sync::Arc;
use std::time::Duration;

use crate::error_handling::{FlushTrigger, StoreError};

/// Delivered to flush subscribers once a batch has been written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushReport {
    /// Batch that was written
    pub batch_id: u64,
    /// Number of documents in the batch
    pub documents: usize,
    /// Write attempts made, including the successful one
    pub attempts: u32,
    /// What captured the batch
    pub trigger: FlushTrigger,
    /// Time spent writing, retry delays included
    pub elapsed: Duration,
}

/// Delivered to error subscribers when a batch is dropped.
///
/// Carries the store error and the exact documents of the failed batch so the
/// subscriber can re-submit, log, or discard them.
pub struct FlushFailure<D> {
    /// Batch that failed
    pub batch_id: u64,
    /// What captured the batch
    pub trigger: FlushTrigger,
    /// Write attempts made before giving up
    pub attempts: u32,
    /// Last error reported by the store
    pub error: Arc<StoreError>,
    /// The batch contents, unchanged and in insertion order
    pub documents: Arc<[D]>,
}

impl<D> FlushFailure<D> {
    /// Returns `true` if the batch was dropped after exhausting retries on a
    /// transient error, as opposed to failing fast.
    pub fn retries_exhausted(&self) -> bool {
        self.error.is_transient()
    }
}

impl<D> Clone for FlushFailure<D> {
    fn clone(&self) -> Self {
        Self {
            batch_id: self.batch_id,
            trigger: self.trigger,
            attempts: self.attempts,
            error: Arc::clone(&self.error),
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<D> std::fmt::Debug for FlushFailure<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushFailure")
            .field("batch_id", &self.batch_id)
            .field("trigger", &self.trigger)
            .field("attempts", &self.attempts)
            .field("error", &self.error)
            .field("documents", &self.documents.len())
            .finish()
    }
}
