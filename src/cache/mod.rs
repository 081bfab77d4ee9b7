//! Write-buffering cache in front of a document store.
//!
//! Documents are buffered and written with one bulk call when the buffer
//! reaches `cache_size`, when the flush timer fires, or when
//! [`WriteCache::flush`] is called.

mod inner;
mod timer;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::config::{CacheConfig, WriteMode};
use crate::error_handling::{FlushStats, FlushTrigger, StoreError, WriteCacheError};
use crate::notifier::{FlushFailure, FlushReport, Subscriber};
use crate::storage::DocumentStore;

use inner::CacheInner;

pub use timer::FlushTimer;

type FlushResult = Result<usize, Arc<StoreError>>;

/// Buffers inserts and writes them to `S` in batches.
///
/// Must be created inside a Tokio runtime: the flush timer and background
/// writes run as tasks on it. Dropping the cache disarms the timer but does
/// not write what is still buffered; call [`WriteCache::close`] for that.
pub struct WriteCache<S: DocumentStore> {
    inner: Arc<CacheInner<S>>,
    timer: FlushTimer,
}

impl<S: DocumentStore> WriteCache<S> {
    /// Validates `config`, then starts the flush timer.
    pub fn new(store: Arc<S>, config: CacheConfig) -> Result<Self, WriteCacheError> {
        config.validate()?;

        let inner = Arc::new(CacheInner::new(store, config));
        let timer = FlushTimer::start(inner.config.flush_time, {
            let inner = Arc::clone(&inner);
            move || {
                let inner = Arc::clone(&inner);
                async move { inner.on_timer().await }
            }
        });

        log::debug!(
            "Write cache started: cache_size={}, flush_time={:?}, mode={:?}",
            inner.config.cache_size,
            inner.config.flush_time,
            inner.config.mode
        );

        Ok(Self { inner, timer })
    }

    /// Buffers one document.
    ///
    /// If this fills the buffer, the batch is written: in background mode the
    /// call returns right away, in inline mode it returns after the write
    /// settled.
    pub async fn insert_one(&self, document: S::Document) {
        if let Some(batch) = self.inner.buffer.push(document) {
            self.inner.dispatch(batch, FlushTrigger::Size).await;
        }
    }

    /// Buffers all `documents` in one step.
    ///
    /// An insert that crosses `cache_size` flushes the whole buffer as a
    /// single batch, even when it ends up larger than `cache_size`.
    pub async fn insert_many<I>(&self, documents: I)
    where
        I: IntoIterator<Item = S::Document>,
    {
        if let Some(batch) = self.inner.buffer.extend(documents) {
            self.inner.dispatch(batch, FlushTrigger::Size).await;
        }
    }

    /// Writes everything currently buffered and waits for that batch to
    /// settle.
    ///
    /// Returns the number of documents written. An empty buffer returns
    /// `Ok(0)` without touching the store. A failed batch is reported to the
    /// error subscribers and also returned here.
    pub async fn flush(&self) -> Result<usize, WriteCacheError> {
        let Some(batch) = self.inner.buffer.take() else {
            return Ok(0);
        };
        let batch_id = batch.id();

        // Listen for this batch before it can possibly settle
        let (tx, rx) = oneshot::channel::<FlushResult>();
        let tx = Arc::new(Mutex::new(Some(tx)));
        let on_flush = Subscriber::new({
            let tx = Arc::clone(&tx);
            move |report: &FlushReport| {
                if report.batch_id == batch_id {
                    send_once(&tx, Ok(report.documents));
                }
            }
        });
        let on_error = Subscriber::new(move |failure: &FlushFailure<S::Document>| {
            if failure.batch_id == batch_id {
                send_once(&tx, Err(Arc::clone(&failure.error)));
            }
        });
        self.inner.on_flush.subscribe(on_flush.clone());
        self.inner.on_error.subscribe(on_error.clone());
        // Removes both on every exit, including a dropped flush future
        let _listeners = FlushListeners {
            inner: &self.inner,
            on_flush,
            on_error,
        };

        self.inner.dispatch(batch, FlushTrigger::Manual).await;

        match rx.await {
            Ok(Ok(documents)) => Ok(documents),
            Ok(Err(source)) => Err(WriteCacheError::FlushFailed { batch_id, source }),
            Err(_) => Err(WriteCacheError::FlushAbandoned { batch_id }),
        }
    }

    /// Registers a callback for successfully written batches.
    ///
    /// Returns `false` if the same handle is already registered.
    pub fn subscribe_on_flush(&self, subscriber: Subscriber<FlushReport>) -> bool {
        self.inner.on_flush.subscribe(subscriber)
    }

    /// Removes a flush callback; returns `false` if it was not registered.
    pub fn unsubscribe_on_flush(&self, subscriber: &Subscriber<FlushReport>) -> bool {
        self.inner.on_flush.unsubscribe(subscriber)
    }

    /// Registers a callback for dropped batches.
    ///
    /// Returns `false` if the same handle is already registered.
    pub fn subscribe_on_error(&self, subscriber: Subscriber<FlushFailure<S::Document>>) -> bool {
        self.inner.on_error.subscribe(subscriber)
    }

    /// Removes an error callback; returns `false` if it was not registered.
    pub fn unsubscribe_on_error(&self, subscriber: &Subscriber<FlushFailure<S::Document>>) -> bool {
        self.inner.on_error.unsubscribe(subscriber)
    }

    /// Documents buffered and not yet captured into a batch.
    pub fn pending(&self) -> usize {
        self.inner.buffer.len()
    }

    /// Background writes that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.inner.writes.len()
    }

    /// Counters for triggers, written and failed batches, and retries.
    pub fn stats(&self) -> &FlushStats {
        &self.inner.stats
    }

    /// The validated configuration this cache runs with.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Whether batches are written in the background or inline.
    pub fn mode(&self) -> WriteMode {
        self.inner.config.mode
    }

    /// The underlying document store.
    pub fn store(&self) -> &Arc<S> {
        &self.inner.store
    }

    /// Stops the timer, flushes what is buffered, and waits for every
    /// background write to finish.
    ///
    /// Returns the result of the final flush.
    pub async fn close(mut self) -> Result<usize, WriteCacheError> {
        self.timer.stop().await;
        let result = self.flush().await;

        self.inner.writes.close();
        self.inner.writes.wait().await;

        log::info!("Write cache closed: {:?}", self.inner.stats);
        result
    }
}

/// The one-shot subscribers of a pending [`WriteCache::flush`].
struct FlushListeners<'a, S: DocumentStore> {
    inner: &'a CacheInner<S>,
    on_flush: Subscriber<FlushReport>,
    on_error: Subscriber<FlushFailure<S::Document>>,
}

impl<S: DocumentStore> Drop for FlushListeners<'_, S> {
    fn drop(&mut self) {
        self.inner.on_flush.unsubscribe(&self.on_flush);
        self.inner.on_error.unsubscribe(&self.on_error);
    }
}

fn send_once(tx: &Mutex<Option<oneshot::Sender<FlushResult>>>, result: FlushResult) {
    let sender = tx.lock().unwrap_or_else(PoisonError::into_inner).take();
    if let Some(sender) = sender {
        // The receiver is gone only if the flushing task was cancelled
        let _ = sender.send(result);
    }
}
