// Shared test helpers for building caches and recording flush events.
//
// This module provides common utilities used across multiple test files to reduce duplication.

#![allow(dead_code)] // Each test binary uses a different subset

use std::sync::{Arc, Mutex};
use std::time::Duration;

use write_cache::{
    CacheConfig, FlushFailure, FlushReport, MemoryStore, Subscriber, WriteCache, WriteMode,
};

pub type TestStore = MemoryStore<u32>;
pub type TestCache = WriteCache<TestStore>;

/// Configuration with short retry delays so failure tests stay readable.
pub fn test_config(cache_size: usize, flush_time: Duration, mode: WriteMode) -> CacheConfig {
    CacheConfig {
        mode,
        retry_interval: Duration::from_secs(1),
        retry_max: 3,
        ..CacheConfig::new(cache_size, flush_time)
    }
}

/// Builds a cache over a fresh in-memory store.
pub fn build_cache(config: CacheConfig) -> (Arc<TestStore>, TestCache) {
    build_cache_with_store(Arc::new(TestStore::new()), config)
}

pub fn build_cache_with_store(store: Arc<TestStore>, config: CacheConfig) -> (Arc<TestStore>, TestCache) {
    let cache = WriteCache::new(Arc::clone(&store), config).expect("valid test config");
    (store, cache)
}

/// Documents `start..end`, handy for checking order after a flush.
pub fn docs(start: u32, end: u32) -> Vec<u32> {
    (start..end).collect()
}

/// Lets spawned background writes run to completion.
///
/// With a paused clock the runtime polls every ready task before advancing
/// time, so one short sleep is enough for writes without store latency.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}

/// Records every flush and error event delivered by a cache.
#[derive(Clone, Default)]
pub struct EventRecorder {
    reports: Arc<Mutex<Vec<FlushReport>>>,
    failures: Arc<Mutex<Vec<FlushFailure<u32>>>>,
}

impl EventRecorder {
    /// Creates a recorder and subscribes it to both event streams of `cache`.
    pub fn attach(cache: &TestCache) -> Self {
        let recorder = Self::default();
        cache.subscribe_on_flush(recorder.flush_subscriber());
        cache.subscribe_on_error(recorder.error_subscriber());
        recorder
    }

    pub fn flush_subscriber(&self) -> Subscriber<FlushReport> {
        let reports = Arc::clone(&self.reports);
        Subscriber::new(move |report: &FlushReport| {
            reports.lock().unwrap().push(report.clone());
        })
    }

    pub fn error_subscriber(&self) -> Subscriber<FlushFailure<u32>> {
        let failures = Arc::clone(&self.failures);
        Subscriber::new(move |failure: &FlushFailure<u32>| {
            failures.lock().unwrap().push(failure.clone());
        })
    }

    pub fn reports(&self) -> Vec<FlushReport> {
        self.reports.lock().unwrap().clone()
    }

    pub fn failures(&self) -> Vec<FlushFailure<u32>> {
        self.failures.lock().unwrap().clone()
    }
}
