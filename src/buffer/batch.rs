//! Immutable batch snapshot.

use std::sync::Arc;

/// Documents captured from the buffer by one flush.
///
/// Once captured a batch is independent of the live buffer. Cloning is cheap:
/// the documents are shared.
pub struct Batch<D> {
    id: u64,
    documents: Arc<[D]>,
}

impl<D> Batch<D> {
    pub(crate) fn new(id: u64, documents: Vec<D>) -> Self {
        Self {
            id,
            documents: documents.into(),
        }
    }

    /// Per-cache sequence number, increasing in capture order.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Number of documents in the batch.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the batch holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// The documents in insertion order.
    pub fn documents(&self) -> &[D] {
        &self.documents
    }

    /// Shared handle to the documents, for handing to another task.
    pub fn shared(&self) -> Arc<[D]> {
        Arc::clone(&self.documents)
    }
}

impl<D> Clone for Batch<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            documents: Arc::clone(&self.documents),
        }
    }
}

impl<D> std::fmt::Debug for Batch<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Batch")
            .field("id", &self.id)
            .field("documents", &self.documents.len())
            .finish()
    }
}
