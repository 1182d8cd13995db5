//! Error types for resource backend operations.

use std::io;
use thiserror::Error;

/// Result type for backend operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors a resource backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested resource does not exist.
    #[error("resource {resource} not found")]
    NotFound {
        /// The resource that was looked up.
        resource: u64,
    },

    /// An I/O error occurred in a backend built on files or sockets.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Any other backend failure.
    #[error("backend error: {0}")]
    Backend(String),
}

impl StorageError {
    /// Creates a not-found error for `resource`.
    pub fn not_found(resource: u64) -> Self {
        Self::NotFound { resource }
    }

    /// Creates a generic backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns true if this error signals a missing resource.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = StorageError::not_found(42);
        assert_eq!(err.to_string(), "resource 42 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn io_converts() {
        let err: StorageError = io::Error::other("disk").into();
        assert!(matches!(err, StorageError::Io(_)));
        assert!(!err.is_not_found());
    }
}
