//! Test backends.
//!
//! Backends tailored to exercising the engine rather than storing data.

use juggler_storage::{ResourceBackend, ResourceId, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Width of the trailer returned by [`TrailerBackend::get`].
pub const TRAILER_LEN: usize = 8;

/// A backend that keeps every write as an append-only log.
///
/// - `put` appends the payload to the resource's log
/// - `get` returns only the last [`TRAILER_LEN`] bytes of the log
/// - `delete` discards the log
///
/// Because nothing is ever overwritten, writes left behind by dropped
/// transactions remain visible to [`crate::verify_chain`].
#[derive(Debug, Default)]
pub struct TrailerBackend {
    logs: Mutex<HashMap<ResourceId, Vec<u8>>>,
}

impl TrailerBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend where resources `0..resources` start with a
    /// 16-byte zero seed.
    #[must_use]
    pub fn seeded(resources: u64) -> Self {
        let backend = Self::new();
        {
            let mut logs = backend.logs.lock();
            for id in 0..resources {
                logs.insert(id, vec![0u8; 2 * TRAILER_LEN]);
            }
        }
        backend
    }

    /// Returns a copy of the full log for `id`.
    #[must_use]
    pub fn log(&self, id: ResourceId) -> Option<Vec<u8>> {
        self.logs.lock().get(&id).cloned()
    }
}

impl ResourceBackend for TrailerBackend {
    fn get(&self, id: ResourceId) -> StorageResult<Vec<u8>> {
        let logs = self.logs.lock();
        let log = logs.get(&id).ok_or_else(|| StorageError::not_found(id))?;
        if log.len() < TRAILER_LEN {
            return Err(StorageError::backend(format!(
                "log for resource {id} shorter than trailer"
            )));
        }
        Ok(log[log.len() - TRAILER_LEN..].to_vec())
    }

    fn put(&self, id: ResourceId, data: &[u8]) -> StorageResult<()> {
        self.logs
            .lock()
            .entry(id)
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }

    fn delete(&self, id: ResourceId) -> StorageResult<()> {
        self.logs.lock().remove(&id);
        Ok(())
    }
}

/// A backend that stores nothing.
///
/// `get` returns an empty payload for every id. Useful for measuring the
/// sequencer alone.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl ResourceBackend for NullBackend {
    fn get(&self, _id: ResourceId) -> StorageResult<Vec<u8>> {
        Ok(Vec::new())
    }

    fn put(&self, _id: ResourceId, _data: &[u8]) -> StorageResult<()> {
        Ok(())
    }

    fn delete(&self, _id: ResourceId) -> StorageResult<()> {
        Ok(())
    }
}
