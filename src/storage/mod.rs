//! Document store boundary.
//!
//! The cache never talks to a database directly: it hands each batch to a
//! [`DocumentStore`]. This module defines that contract and ships an
//! in-memory implementation plus, behind the `mongodb` feature, a MongoDB
//! collection adapter.

mod memory;
#[cfg(feature = "mongodb")]
mod mongo;

use async_trait::async_trait;

use crate::error_handling::StoreError;

pub use memory::MemoryStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoStore;

/// Default record type: an opaque string-keyed map of arbitrary values.
pub type Document = serde_json::Map<String, serde_json::Value>;

/// A store that accepts ordered bulk inserts.
///
/// Implementations must accept batches of any size in one call and be safe to
/// call from several tasks at once; the cache does not serialize writes of
/// different batches. Return a transient [`StoreError`] (see
/// [`StoreError::is_transient`]) for conditions worth retrying.
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Record type written by this store.
    type Document: Send + Sync + 'static;

    /// Inserts `documents` in order.
    async fn insert_many(&self, documents: &[Self::Document]) -> Result<(), StoreError>;
}
