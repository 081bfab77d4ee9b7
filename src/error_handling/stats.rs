//! Flush statistics tracking.
//!
//! This module provides thread-safe counters describing what the cache has
//! written, what it dropped, and what triggered each flush.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use strum::IntoEnumIterator;
use strum_macros::EnumIter as EnumIterMacro;

/// What caused a batch to be captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FlushTrigger {
    /// The buffer reached `cache_size`
    Size,
    /// The periodic timer fired with documents pending
    Timer,
    /// An explicit `flush` (or `close`) call
    Manual,
}

impl FlushTrigger {
    /// Returns a human-readable string representation of the trigger.
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Size => "size",
            FlushTrigger::Timer => "timer",
            FlushTrigger::Manual => "manual",
        }
    }
}

impl std::fmt::Display for FlushTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thread-safe flush statistics.
///
/// Counters are updated by whichever task finishes a write, so the struct is
/// shared by reference from the cache and never locked.
pub struct FlushStats {
    triggers: HashMap<FlushTrigger, AtomicUsize>,
    batches_written: AtomicUsize,
    batches_failed: AtomicUsize,
    documents_written: AtomicUsize,
    documents_failed: AtomicUsize,
    retries: AtomicUsize,
}

impl FlushStats {
    /// Creates zeroed counters, one per trigger.
    pub fn new() -> Self {
        let mut triggers = HashMap::new();
        for trigger in FlushTrigger::iter() {
            triggers.insert(trigger, AtomicUsize::new(0));
        }

        FlushStats {
            triggers,
            batches_written: AtomicUsize::new(0),
            batches_failed: AtomicUsize::new(0),
            documents_written: AtomicUsize::new(0),
            documents_failed: AtomicUsize::new(0),
            retries: AtomicUsize::new(0),
        }
    }

    /// Counts a captured batch against its trigger.
    pub fn record_trigger(&self, trigger: FlushTrigger) {
        if let Some(counter) = self.triggers.get(&trigger) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment trigger counter for {:?} which is not in the map",
                trigger
            );
        }
    }

    /// Records a batch that reached the store.
    pub fn record_success(&self, documents: usize, attempts: u32) {
        self.batches_written.fetch_add(1, Ordering::Relaxed);
        self.documents_written
            .fetch_add(documents, Ordering::Relaxed);
        self.record_retries(attempts);
    }

    /// Records a batch that was dropped after a terminal failure.
    pub fn record_failure(&self, documents: usize, attempts: u32) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.documents_failed.fetch_add(documents, Ordering::Relaxed);
        self.record_retries(attempts);
    }

    fn record_retries(&self, attempts: u32) {
        // The first attempt is not a retry
        let retries = attempts.saturating_sub(1) as usize;
        self.retries.fetch_add(retries, Ordering::Relaxed);
    }

    /// Batches captured by `trigger`.
    pub fn trigger_count(&self, trigger: FlushTrigger) -> usize {
        self.triggers
            .get(&trigger)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Batches the store accepted.
    pub fn batches_written(&self) -> usize {
        self.batches_written.load(Ordering::Relaxed)
    }

    /// Batches dropped after a fatal error or exhausted retries.
    pub fn batches_failed(&self) -> usize {
        self.batches_failed.load(Ordering::Relaxed)
    }

    /// Documents in accepted batches.
    pub fn documents_written(&self) -> usize {
        self.documents_written.load(Ordering::Relaxed)
    }

    /// Documents in dropped batches.
    pub fn documents_failed(&self) -> usize {
        self.documents_failed.load(Ordering::Relaxed)
    }

    /// Store calls beyond the first attempt of each batch.
    pub fn retries(&self) -> usize {
        self.retries.load(Ordering::Relaxed)
    }

    /// Total number of captured batches across all triggers.
    pub fn total_flushes(&self) -> usize {
        self.triggers
            .values()
            .map(|c| c.load(Ordering::Relaxed))
            .sum()
    }
}

impl Default for FlushStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FlushStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlushStats")
            .field("size_flushes", &self.trigger_count(FlushTrigger::Size))
            .field("timer_flushes", &self.trigger_count(FlushTrigger::Timer))
            .field("manual_flushes", &self.trigger_count(FlushTrigger::Manual))
            .field("batches_written", &self.batches_written())
            .field("batches_failed", &self.batches_failed())
            .field("documents_written", &self.documents_written())
            .field("documents_failed", &self.documents_failed())
            .field("retries", &self.retries())
            .finish()
    }
}
