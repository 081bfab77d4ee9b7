//! write_cache library: batched document inserts
//!
//! This library buffers document inserts in memory and writes them to a
//! [`DocumentStore`] with one bulk call per batch. A batch is captured when the
//! buffer reaches `cache_size` documents, when the periodic timer fires, or on
//! an explicit [`WriteCache::flush`]. Transient store errors are retried with a
//! fixed delay; the outcome of every batch is reported to subscribers.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use write_cache::{CacheConfig, FlushFailure, MemoryStore, Subscriber, WriteCache};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::<u64>::new());
//! let cache = WriteCache::new(store, CacheConfig::new(100, Duration::from_secs(5)))?;
//!
//! cache.subscribe_on_error(Subscriber::new(|failure: &FlushFailure<u64>| {
//!     eprintln!("dropped {} documents: {}", failure.documents.len(), failure.error);
//! }));
//!
//! for n in 0..1_000 {
//!     cache.insert_one(n).await;
//! }
//!
//! let written = cache.close().await?;
//! println!("final flush wrote {} documents", written);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

mod buffer;
mod cache;
pub mod config;
mod error_handling;
pub mod initialization;
mod notifier;
mod storage;
mod write;

// Re-export public API
pub use buffer::Batch;
pub use cache::{FlushTimer, WriteCache};
pub use config::{CacheConfig, LogFormat, LogLevel, WriteMode};
pub use error_handling::{
    ConfigError, FlushStats, FlushTrigger, InitializationError, StoreError, WriteCacheError,
};
pub use notifier::{FlushFailure, FlushReport, Notifier, Subscriber};
pub use storage::{Document, DocumentStore, MemoryStore};
#[cfg(feature = "mongodb")]
pub use storage::MongoStore;
pub use write::{write_with_retry, RetryPolicy, WriteOutcome};
