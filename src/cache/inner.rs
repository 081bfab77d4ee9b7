//! Shared buffering core.
//!
//! Owned behind an `Arc` by the cache handle, the timer task, and every
//! background write, so a batch can finish after the call that captured it
//! has returned.

use std::sync::Arc;

use tokio::time::Instant;
use tokio_util::task::TaskTracker;

use crate::buffer::{Batch, WriteBuffer};
use crate::config::{CacheConfig, WriteMode};
use crate::error_handling::{FlushStats, FlushTrigger};
use crate::notifier::{FlushFailure, FlushReport, Notifier};
use crate::storage::DocumentStore;
use crate::write::{write_with_retry, RetryPolicy};

pub(crate) struct CacheInner<S: DocumentStore> {
    pub(crate) store: Arc<S>,
    pub(crate) config: CacheConfig,
    pub(crate) buffer: WriteBuffer<S::Document>,
    pub(crate) on_flush: Notifier<FlushReport>,
    pub(crate) on_error: Notifier<FlushFailure<S::Document>>,
    pub(crate) stats: FlushStats,
    pub(crate) writes: TaskTracker,
    retry_policy: RetryPolicy,
}

impl<S: DocumentStore> CacheInner<S> {
    pub(crate) fn new(store: Arc<S>, config: CacheConfig) -> Self {
        CacheInner {
            store,
            buffer: WriteBuffer::new(config.cache_size),
            retry_policy: RetryPolicy::from(&config),
            config,
            on_flush: Notifier::new(),
            on_error: Notifier::new(),
            stats: FlushStats::new(),
            writes: TaskTracker::new(),
        }
    }

    /// Periodic check: flush whatever is pending, if anything.
    pub(crate) async fn on_timer(self: &Arc<Self>) {
        if let Some(batch) = self.buffer.take() {
            self.dispatch(batch, FlushTrigger::Timer).await;
        }
    }

    /// Hands a captured batch to the configured write strategy.
    ///
    /// The write always runs as a tracked task, so a captured batch settles
    /// even if the caller is dropped. In background mode this returns as soon
    /// as the write is spawned; in inline mode it returns once the batch
    /// reached a terminal state and the subscribers were told.
    pub(crate) async fn dispatch(self: &Arc<Self>, batch: Batch<S::Document>, trigger: FlushTrigger) {
        self.stats.record_trigger(trigger);
        let batch_id = batch.id();
        log::debug!(
            "Flushing batch {} of {} documents ({} trigger)",
            batch_id,
            batch.len(),
            trigger
        );

        let inner = Arc::clone(self);
        let handle = self.writes.spawn(async move {
            inner.write(batch, trigger).await;
        });

        if self.config.mode == WriteMode::Inline {
            if let Err(e) = handle.await {
                log::error!("Write task for batch {} did not complete: {}", batch_id, e);
            }
        }
    }

    async fn write(&self, batch: Batch<S::Document>, trigger: FlushTrigger) {
        let start = Instant::now();
        let outcome = write_with_retry(&self.store, &batch, &self.retry_policy).await;

        match outcome.result {
            Ok(()) => {
                self.stats.record_success(batch.len(), outcome.attempts);
                let report = FlushReport {
                    batch_id: batch.id(),
                    documents: batch.len(),
                    attempts: outcome.attempts,
                    trigger,
                    elapsed: start.elapsed(),
                };
                log::debug!(
                    "Successfully flushed batch {} ({} documents, {} attempt(s))",
                    report.batch_id,
                    report.documents,
                    report.attempts
                );
                self.notify_flush(report);
            }
            Err(error) => {
                self.stats.record_failure(batch.len(), outcome.attempts);
                log::error!(
                    "Dropping batch {} of {} documents after {} attempt(s): {}",
                    batch.id(),
                    batch.len(),
                    outcome.attempts,
                    error
                );
                let failure = FlushFailure {
                    batch_id: batch.id(),
                    trigger,
                    attempts: outcome.attempts,
                    error: Arc::new(error),
                    documents: batch.shared(),
                };
                self.notify_error(failure);
            }
        }
    }

    fn notify_flush(&self, report: FlushReport) {
        if self.config.notify_concurrently {
            self.on_flush.notify_async(report);
        } else {
            self.on_flush.notify(&report);
        }
    }

    fn notify_error(&self, failure: FlushFailure<S::Document>) {
        if self.config.notify_concurrently {
            self.on_error.notify_async(failure);
        } else {
            self.on_error.notify(&failure);
        }
    }
}
