//! Resource backend trait definition.

use crate::error::StorageResult;

/// Opaque key into a resource backend.
pub type ResourceId = u64;

/// The key-value capability coordinated by the Juggler engine.
///
/// Backends are **opaque byte stores**. They provide no atomicity and no
/// ordering of their own; the engine decides which transaction may touch
/// which resource and when.
///
/// # Invariants
///
/// - `get` returns the bytes most recently stored under `id`, or
///   [`StorageError::NotFound`](crate::StorageError::NotFound)
/// - `put` and `delete` take `&self`: backends are shared between
///   transactions and use interior mutability
/// - Backends must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
pub trait ResourceBackend: Send + Sync {
    /// Reads the bytes stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource does not exist or the backend fails.
    fn get(&self, id: ResourceId) -> StorageResult<Vec<u8>>;

    /// Stores `data` under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn put(&self, id: ResourceId, data: &[u8]) -> StorageResult<()>;

    /// Removes the resource stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete(&self, id: ResourceId) -> StorageResult<()>;
}

impl<B: ResourceBackend + ?Sized> ResourceBackend for Box<B> {
    fn get(&self, id: ResourceId) -> StorageResult<Vec<u8>> {
        (**self).get(id)
    }

    fn put(&self, id: ResourceId, data: &[u8]) -> StorageResult<()> {
        (**self).put(id, data)
    }

    fn delete(&self, id: ResourceId) -> StorageResult<()> {
        (**self).delete(id)
    }
}
