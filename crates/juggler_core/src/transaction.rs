//! Transactions over a resource backend.

use crate::error::CoreResult;
use crate::process::ProcessHandle;
use crate::types::{ResourceId, SequenceNumber};
use juggler_storage::ResourceBackend;
use std::sync::Arc;

/// A transaction: a process handle paired with the shared backend.
///
/// Reads register the resource with the sequencer before touching the
/// backend. Writes first wait for commit admission, then write the backend,
/// then report the write so that conflicting later transactions are dropped.
///
/// A write that reaches the backend is never rolled back, even if this
/// transaction is dropped afterwards. Callers that retry on
/// [`CoreError::Dropped`](crate::CoreError::Dropped) must tolerate writes
/// left behind by abandoned attempts.
#[derive(Debug)]
pub struct Transaction<B: ResourceBackend + ?Sized> {
    backend: Arc<B>,
    process: ProcessHandle,
}

impl<B: ResourceBackend + ?Sized> Transaction<B> {
    pub(crate) fn new(backend: Arc<B>, process: ProcessHandle) -> Self {
        Self { backend, process }
    }

    /// Returns this transaction's sequence number.
    #[must_use]
    pub fn seq(&self) -> SequenceNumber {
        self.process.seq()
    }

    /// Returns true once [`finish`](Self::finish) has been called.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.process.is_finished()
    }

    /// Reads `id` from the backend.
    ///
    /// Backend errors such as not-found are passed through unchanged.
    pub fn read(&mut self, id: ResourceId) -> CoreResult<Vec<u8>> {
        self.process.read(id)?;
        Ok(self.backend.get(id)?)
    }

    /// Writes `data` under `id`. May block until admitted.
    pub fn write(&mut self, id: ResourceId, data: &[u8]) -> CoreResult<()> {
        self.process.request_commit()?;
        self.backend.put(id, data)?;
        self.process.report_write(id)
    }

    /// Deletes `id`. May block until admitted.
    pub fn remove(&mut self, id: ResourceId) -> CoreResult<()> {
        self.process.request_commit()?;
        self.backend.delete(id)?;
        self.process.report_write(id)
    }

    /// Closes the read set: no new resources may be touched afterwards.
    pub fn set_limited(&mut self) -> CoreResult<()> {
        self.process.set_limited()
    }

    /// Releases the transaction. Idempotent.
    pub fn finish(&mut self) -> CoreResult<()> {
        self.process.finish()
    }
}

#[cfg(test)]
mod tests {
    use crate::error::CoreError;
    use crate::Juggler;
    use juggler_storage::{InMemoryBackend, ResourceBackend, StorageError, StorageResult};

    /// Backend whose writes always fail.
    struct FailingBackend;

    impl ResourceBackend for FailingBackend {
        fn get(&self, id: u64) -> StorageResult<Vec<u8>> {
            Err(StorageError::not_found(id))
        }

        fn put(&self, _id: u64, _data: &[u8]) -> StorageResult<()> {
            Err(StorageError::backend("read-only"))
        }

        fn delete(&self, _id: u64) -> StorageResult<()> {
            Err(StorageError::backend("read-only"))
        }
    }

    /// Backend whose reads fail with an I/O error.
    struct UnreadableBackend;

    impl ResourceBackend for UnreadableBackend {
        fn get(&self, _id: u64) -> StorageResult<Vec<u8>> {
            Err(std::io::Error::other("disk unavailable").into())
        }

        fn put(&self, _id: u64, _data: &[u8]) -> StorageResult<()> {
            Ok(())
        }

        fn delete(&self, _id: u64) -> StorageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn read_passes_io_error_through() {
        let juggler = Juggler::new(UnreadableBackend);
        let mut tx = juggler.begin();
        match tx.read(4) {
            Err(CoreError::Storage(StorageError::Io(e))) => {
                assert_eq!(e.to_string(), "disk unavailable");
            }
            other => panic!("expected I/O error, got {other:?}"),
        }
        assert_eq!(juggler.sequencer().entry(tx.seq()).unwrap().touched, vec![4]);
        tx.finish().unwrap();
    }

    #[test]
    fn read_returns_backend_bytes() {
        let juggler = Juggler::new(InMemoryBackend::with_data([(1, b"one".to_vec())]));
        let mut tx = juggler.begin();
        assert_eq!(tx.read(1).unwrap(), b"one");
        tx.finish().unwrap();
    }

    #[test]
    fn read_missing_passes_not_found_through() {
        let juggler = Juggler::new(InMemoryBackend::new());
        let mut tx = juggler.begin();
        match tx.read(3) {
            Err(CoreError::Storage(e)) => assert!(e.is_not_found()),
            other => panic!("expected not found, got {other:?}"),
        }
        // The read is still registered
        let entry = juggler.sequencer().entry(tx.seq()).unwrap();
        assert_eq!(entry.touched, vec![3]);
    }

    #[test]
    fn write_then_remove() {
        let juggler = Juggler::new(InMemoryBackend::new());
        let mut tx = juggler.begin();
        tx.write(5, b"five").unwrap();
        assert_eq!(juggler.backend().get(5).unwrap(), b"five");
        tx.remove(5).unwrap();
        assert!(juggler.backend().get(5).unwrap_err().is_not_found());
        tx.finish().unwrap();
    }

    #[test]
    fn failed_backend_write_is_not_reported() {
        let juggler = Juggler::new(FailingBackend);
        let mut tx = juggler.begin();
        assert!(matches!(tx.write(1, b"x"), Err(CoreError::Storage(_))));
        assert!(matches!(tx.remove(1), Err(CoreError::Storage(_))));

        // Admitted, but the failed write never reached the touched set
        let entry = juggler.sequencer().entry(tx.seq()).unwrap();
        assert!(entry.committing);
        assert!(entry.touched.is_empty());
    }

    #[test]
    fn write_after_finish_fails_without_backend_access() {
        let juggler = Juggler::new(InMemoryBackend::new());
        let mut tx = juggler.begin();
        tx.finish().unwrap();
        assert!(tx.is_finished());
        assert!(matches!(tx.write(1, b"x"), Err(CoreError::Finished { .. })));
        assert!(juggler.backend().is_empty());
    }

    #[test]
    fn dropped_transaction_keeps_applied_writes() {
        let juggler = Juggler::new(InMemoryBackend::with_data([(1, vec![0])]));
        let mut a = juggler.begin();
        let mut b = juggler.begin();
        a.read(1).unwrap();
        b.read(1).unwrap();

        a.write(1, b"a").unwrap();
        assert!(b.read(1).unwrap_err().is_dropped());
        assert!(b.write(1, b"b").unwrap_err().is_dropped());
        b.finish().unwrap();
        a.finish().unwrap();

        assert_eq!(juggler.backend().get(1).unwrap(), b"a");
    }
}
