//! In-memory write buffer.
//!
//! The buffer owns the documents inserted since the last capture. Appending
//! and capturing share a single lock, so the size check and the swap to an
//! empty buffer happen in one critical section: a document is either part of
//! the captured batch or of the next one, never both and never neither.

mod batch;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use batch::Batch;

struct BufferState<D> {
    documents: Vec<D>,
    next_batch_id: u64,
}

impl<D> BufferState<D> {
    fn capture(&mut self) -> Batch<D> {
        let id = self.next_batch_id;
        self.next_batch_id += 1;
        Batch::new(id, std::mem::take(&mut self.documents))
    }
}

/// Append-only document buffer with a size trigger.
pub struct WriteBuffer<D> {
    cache_size: usize,
    state: Mutex<BufferState<D>>,
}

impl<D> WriteBuffer<D> {
    pub fn new(cache_size: usize) -> Self {
        WriteBuffer {
            cache_size,
            state: Mutex::new(BufferState {
                documents: Vec::new(),
                next_batch_id: 0,
            }),
        }
    }

    /// Appends one document.
    ///
    /// Returns the captured batch if the buffer reached `cache_size`.
    pub fn push(&self, document: D) -> Option<Batch<D>> {
        let mut state = self.lock();
        state.documents.push(document);
        self.capture_if_full(&mut state)
    }

    /// Appends all documents in one step.
    ///
    /// The size threshold is a trigger, not a cap: if the buffer crosses it,
    /// the whole buffer is captured, including every document of this call.
    pub fn extend<I>(&self, documents: I) -> Option<Batch<D>>
    where
        I: IntoIterator<Item = D>,
    {
        // Collect outside the lock so caller iterator code never runs under it
        let documents: Vec<D> = documents.into_iter().collect();
        if documents.is_empty() {
            return None;
        }

        let mut state = self.lock();
        state.documents.extend(documents);
        self.capture_if_full(&mut state)
    }

    /// Captures everything buffered, leaving an empty buffer behind.
    ///
    /// Returns `None` when nothing is buffered.
    pub fn take(&self) -> Option<Batch<D>> {
        let mut state = self.lock();
        if state.documents.is_empty() {
            return None;
        }
        Some(state.capture())
    }

    pub fn len(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().documents.is_empty()
    }

    pub fn cache_size(&self) -> usize {
        self.cache_size
    }

    fn capture_if_full(&self, state: &mut BufferState<D>) -> Option<Batch<D>> {
        if state.documents.len() >= self.cache_size {
            Some(state.capture())
        } else {
            None
        }
    }

    fn lock(&self) -> MutexGuard<'_, BufferState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_push_below_threshold_keeps_documents() {
        let buffer = WriteBuffer::new(3);
        assert!(buffer.push(1).is_none());
        assert!(buffer.push(2).is_none());
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn test_push_reaching_threshold_captures_in_order() {
        let buffer = WriteBuffer::new(3);
        buffer.push("a");
        buffer.push("b");
        let batch = buffer.push("c").expect("threshold reached");

        assert_eq!(batch.documents(), &["a", "b", "c"]);
        assert_eq!(batch.id(), 0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_extend_larger_than_threshold_is_one_batch() {
        let buffer = WriteBuffer::new(5);
        buffer.push(0);
        let batch = buffer.extend(1..=9).expect("threshold crossed");

        assert_eq!(batch.len(), 10);
        assert_eq!(batch.documents(), &(0..=9).collect::<Vec<_>>()[..]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_extend_empty_is_noop() {
        let buffer = WriteBuffer::<u8>::new(1);
        assert!(buffer.extend(Vec::new()).is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_take_empty_returns_none() {
        let buffer = WriteBuffer::<u8>::new(10);
        assert!(buffer.take().is_none());
    }

    #[test]
    fn test_batch_ids_increase_and_capture_is_independent() {
        let buffer = WriteBuffer::new(10);
        buffer.push(1);
        let first = buffer.take().unwrap();
        buffer.push(2);
        let second = buffer.take().unwrap();

        assert_eq!(first.id(), 0);
        assert_eq!(second.id(), 1);
        assert_eq!(first.documents(), &[1]);
        assert_eq!(second.documents(), &[2]);
    }

    #[test]
    fn test_concurrent_pushes_lose_and_duplicate_nothing() {
        let buffer = Arc::new(WriteBuffer::new(7));
        let batches = Arc::new(Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..8)
            .map(|thread| {
                let buffer = Arc::clone(&buffer);
                let batches = Arc::clone(&batches);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        if let Some(batch) = buffer.push(thread * 1000 + i) {
                            batches.lock().unwrap().push(batch);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut seen: Vec<u32> = batches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|b| b.documents().to_vec())
            .collect();
        if let Some(rest) = buffer.take() {
            seen.extend_from_slice(rest.documents());
        }
        seen.sort_unstable();

        let mut expected: Vec<u32> = (0..8)
            .flat_map(|t| (0..500).map(move |i| t * 1000 + i))
            .collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }
}
