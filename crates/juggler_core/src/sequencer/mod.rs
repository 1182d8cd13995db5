//! Transaction ordering and conflict detection.
//!
//! Juggler orders transactions without help from the backend:
//! - **Ordering**: every transaction gets a strictly increasing sequence number
//! - **Admission**: writes are admitted in sequence order, unless a limited
//!   transaction provably cannot conflict with any earlier one (overtake)
//! - **Invalidation**: a reported write drops every later transaction whose
//!   touched set overlaps the writer's

mod entry;
mod manager;
mod touched;

pub use entry::EntrySnapshot;
pub use manager::Sequencer;
pub use touched::TouchedSet;
