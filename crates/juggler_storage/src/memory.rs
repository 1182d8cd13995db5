//! In-memory resource backend for testing.

use crate::backend::{ResourceBackend, ResourceId};
use crate::error::{StorageError, StorageResult};
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory resource backend.
///
/// This backend stores all resources in a hash map and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Demos that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use juggler_storage::{InMemoryBackend, ResourceBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.put(1, b"test data").unwrap();
/// assert_eq!(backend.len(), 1);
/// backend.delete(1).unwrap();
/// assert!(backend.get(1).unwrap_err().is_not_found());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: RwLock<HashMap<ResourceId, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory backend with pre-existing resources.
    #[must_use]
    pub fn with_data(data: impl IntoIterator<Item = (ResourceId, Vec<u8>)>) -> Self {
        Self {
            data: RwLock::new(data.into_iter().collect()),
        }
    }

    /// Returns a copy of all resources, sorted by id.
    ///
    /// Useful for testing and debugging.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(ResourceId, Vec<u8>)> {
        let mut all: Vec<_> = self
            .data
            .read()
            .iter()
            .map(|(id, bytes)| (*id, bytes.clone()))
            .collect();
        all.sort_unstable_by_key(|(id, _)| *id);
        all
    }

    /// Returns the number of stored resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if no resources are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Removes every resource.
    pub fn clear(&self) {
        self.data.write().clear();
    }
}

impl ResourceBackend for InMemoryBackend {
    fn get(&self, id: ResourceId) -> StorageResult<Vec<u8>> {
        self.data
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found(id))
    }

    fn put(&self, id: ResourceId, data: &[u8]) -> StorageResult<()> {
        self.data.write().insert(id, data.to_vec());
        Ok(())
    }

    fn delete(&self, id: ResourceId) -> StorageResult<()> {
        // Deleting a missing resource is not an error
        self.data.write().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn memory_new_is_empty() {
        let backend = InMemoryBackend::new();
        assert!(backend.is_empty());
        assert!(backend.snapshot().is_empty());
    }

    #[test]
    fn memory_put_then_get() {
        let backend = InMemoryBackend::new();
        backend.put(5, b"hello").unwrap();
        assert_eq!(backend.get(5).unwrap(), b"hello");
    }

    #[test]
    fn memory_put_overwrites() {
        let backend = InMemoryBackend::new();
        backend.put(5, b"one").unwrap();
        backend.put(5, b"two").unwrap();
        assert_eq!(backend.get(5).unwrap(), b"two");
        assert_eq!(backend.len(), 1);
    }

    #[test]
    fn memory_get_missing_is_not_found() {
        let backend = InMemoryBackend::new();
        let result = backend.get(9);
        assert!(matches!(result, Err(StorageError::NotFound { resource: 9 })));
    }

    #[test]
    fn memory_delete_removes() {
        let backend = InMemoryBackend::new();
        backend.put(1, b"x").unwrap();
        backend.delete(1).unwrap();
        assert!(backend.get(1).unwrap_err().is_not_found());
    }

    #[test]
    fn memory_delete_missing_succeeds() {
        let backend = InMemoryBackend::new();
        assert!(backend.delete(77).is_ok());
    }

    #[test]
    fn memory_with_data_and_snapshot_order() {
        let backend = InMemoryBackend::with_data([(3, vec![3]), (1, vec![1]), (2, vec![2])]);
        let ids: Vec<_> = backend.snapshot().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn memory_clear() {
        let backend = InMemoryBackend::with_data([(1, vec![1])]);
        backend.clear();
        assert!(backend.is_empty());
    }

    #[test]
    fn memory_concurrent_puts() {
        let backend = Arc::new(InMemoryBackend::new());
        let handles: Vec<_> = (0..4u64)
            .map(|t| {
                let backend = Arc::clone(&backend);
                thread::spawn(move || {
                    for i in 0..100u64 {
                        backend.put(t * 1000 + i, &i.to_be_bytes()).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("Thread panicked");
        }
        assert_eq!(backend.len(), 400);
    }

    #[test]
    fn boxed_backend_forwards() {
        let backend: Box<dyn ResourceBackend> = Box::new(InMemoryBackend::new());
        backend.put(1, b"boxed").unwrap();
        assert_eq!(backend.get(1).unwrap(), b"boxed");
        backend.delete(1).unwrap();
        assert!(backend.get(1).is_err());
    }
}
