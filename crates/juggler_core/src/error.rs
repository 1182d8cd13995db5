//! Error types for Juggler core.

use crate::types::{ResourceId, SequenceNumber};
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in Juggler core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backend error, passed through unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] juggler_storage::StorageError),

    /// A new resource was touched after the read set was closed.
    #[error("{seq} is limited and cannot touch new resource {resource}")]
    Limited {
        /// The limited transaction.
        seq: SequenceNumber,
        /// The resource that was not yet in the touched set.
        resource: ResourceId,
    },

    /// A write was reported before commit admission was granted.
    #[error("{seq} reported a write while not in charge")]
    NotInCharge {
        /// The offending transaction.
        seq: SequenceNumber,
    },

    /// The transaction was invalidated by a conflicting earlier commit.
    ///
    /// This is the retry signal: discard the transaction and run the whole
    /// operation again with a fresh one.
    #[error("{seq} was dropped by a conflicting commit")]
    Dropped {
        /// The dropped transaction.
        seq: SequenceNumber,
    },

    /// An operation was attempted on a finished handle.
    #[error("{seq} is already finished")]
    Finished {
        /// The finished transaction.
        seq: SequenceNumber,
    },
}

impl CoreError {
    /// Creates a limited error.
    pub fn limited(seq: SequenceNumber, resource: ResourceId) -> Self {
        Self::Limited { seq, resource }
    }

    /// Creates a not-in-charge error.
    pub fn not_in_charge(seq: SequenceNumber) -> Self {
        Self::NotInCharge { seq }
    }

    /// Creates a dropped error.
    pub fn dropped(seq: SequenceNumber) -> Self {
        Self::Dropped { seq }
    }

    /// Creates a finished error.
    pub fn finished(seq: SequenceNumber) -> Self {
        Self::Finished { seq }
    }

    /// Returns true if the transaction must be retried from scratch.
    #[must_use]
    pub fn is_dropped(&self) -> bool {
        matches!(self, Self::Dropped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use juggler_storage::StorageError;

    #[test]
    fn dropped_is_retry_signal() {
        let seq = SequenceNumber::new(3);
        assert!(CoreError::dropped(seq).is_dropped());
        assert!(!CoreError::finished(seq).is_dropped());
        assert!(!CoreError::not_in_charge(seq).is_dropped());
        assert!(!CoreError::limited(seq, 1).is_dropped());
    }

    #[test]
    fn messages_name_the_transaction() {
        let err = CoreError::limited(SequenceNumber::new(7), 12);
        assert_eq!(err.to_string(), "seq:7 is limited and cannot touch new resource 12");
        let err = CoreError::dropped(SequenceNumber::new(2));
        assert_eq!(err.to_string(), "seq:2 was dropped by a conflicting commit");
    }

    #[test]
    fn storage_errors_pass_through() {
        let err: CoreError = StorageError::not_found(5).into();
        match err {
            CoreError::Storage(inner) => assert!(inner.is_not_found()),
            other => panic!("expected storage error, got {other:?}"),
        }
    }
}
