//! # Juggler Storage
//!
//! Resource backend trait and implementations for Juggler.
//!
//! This crate provides the external key-value capability the Juggler engine
//! coordinates access to. Backends are **opaque byte stores** keyed by a
//! `u64` resource id - they do not lock, version, or order anything.
//!
//! ## Design Principles
//!
//! - Backends expose only `get`, `put`, and `delete`
//! - No knowledge of transactions or sequence numbers
//! - Must be `Send + Sync` and tolerate unsynchronized concurrent callers
//! - All coordination is the engine's responsibility
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral storage
//!
//! ## Example
//!
//! ```rust
//! use juggler_storage::{InMemoryBackend, ResourceBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.put(7, b"hello world").unwrap();
//! assert_eq!(backend.get(7).unwrap(), b"hello world");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod memory;

pub use backend::{ResourceBackend, ResourceId};
pub use error::{StorageError, StorageResult};
pub use memory::InMemoryBackend;
