//! # Juggler Core
//!
//! Transactional access control over an external key-value resource store.
//!
//! This crate provides:
//! - A sequencer that gives every transaction a place in a global order
//! - Commit admission with overtaking for provably disjoint transactions
//! - Cascading abort of transactions invalidated by an earlier commit
//! - Single-owner process handles and transactions over a [`ResourceBackend`]
//!
//! The engine neither stores data nor rolls back writes of dropped
//! transactions; retrying on [`CoreError::Dropped`] is the caller's job.
//!
//! [`ResourceBackend`]: juggler_storage::ResourceBackend

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod juggler;
mod process;
mod sequencer;
mod stats;
mod transaction;
mod types;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use juggler::Juggler;
pub use process::ProcessHandle;
pub use sequencer::{EntrySnapshot, Sequencer, TouchedSet};
pub use stats::{SequencerStats, StatsSnapshot};
pub use transaction::Transaction;
pub use types::{ResourceId, SequenceNumber};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
