//! Sequencer statistics.
//!
//! Counters describing how transactions moved through the sequencer.
//!
//! # Usage
//!
//! ```rust
//! use juggler_core::Juggler;
//! use juggler_storage::InMemoryBackend;
//!
//! let juggler = Juggler::new(InMemoryBackend::new());
//! let mut tx = juggler.begin();
//! tx.finish().unwrap();
//!
//! let stats = juggler.stats();
//! assert_eq!(stats.started(), 1);
//! assert_eq!(stats.finished(), 1);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequencer statistics.
///
/// All counters are atomic and can be read while operations are in progress.
/// Values are monotonically increasing.
#[derive(Debug, Default)]
pub struct SequencerStats {
    /// Transactions allocated.
    started: AtomicU64,
    /// Commit admissions granted (re-entrant requests are not counted).
    admitted: AtomicU64,
    /// Admissions granted ahead of earlier transactions.
    overtakes: AtomicU64,
    /// Condition variable waits performed by commit requests.
    waits: AtomicU64,
    /// Transactions removed by a cascading abort.
    dropped: AtomicU64,
    /// Transactions removed by finish.
    finished: AtomicU64,
}

impl SequencerStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_start(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_admission(&self, overtake: bool) {
        self.admitted.fetch_add(1, Ordering::Relaxed);
        if overtake {
            self.overtakes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drop(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_finish(&self) {
        self.finished.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of transactions allocated.
    pub fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    /// Returns the number of commit admissions granted.
    pub fn admitted(&self) -> u64 {
        self.admitted.load(Ordering::Relaxed)
    }

    /// Returns the number of admissions granted by overtaking.
    pub fn overtakes(&self) -> u64 {
        self.overtakes.load(Ordering::Relaxed)
    }

    /// Returns the number of waits performed by commit requests.
    pub fn waits(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions dropped by cascading aborts.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Returns the number of transactions removed by finish.
    pub fn finished(&self) -> u64 {
        self.finished.load(Ordering::Relaxed)
    }

    /// Returns a point-in-time copy of every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            started: self.started(),
            admitted: self.admitted(),
            overtakes: self.overtakes(),
            waits: self.waits(),
            dropped: self.dropped(),
            finished: self.finished(),
        }
    }
}

/// A point-in-time copy of [`SequencerStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Transactions allocated.
    pub started: u64,
    /// Commit admissions granted.
    pub admitted: u64,
    /// Admissions granted by overtaking.
    pub overtakes: u64,
    /// Waits performed by commit requests.
    pub waits: u64,
    /// Transactions dropped by cascading aborts.
    pub dropped: u64,
    /// Transactions removed by finish.
    pub finished: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_stats_are_zero() {
        let stats = SequencerStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn overtake_counts_as_admission() {
        let stats = SequencerStats::new();
        stats.record_admission(false);
        stats.record_admission(true);
        assert_eq!(stats.admitted(), 2);
        assert_eq!(stats.overtakes(), 1);
    }

    #[test]
    fn snapshot_copies_counters() {
        let stats = SequencerStats::new();
        stats.record_start();
        stats.record_start();
        stats.record_wait();
        stats.record_drop();
        stats.record_finish();

        let snap = stats.snapshot();
        assert_eq!(snap.started, 2);
        assert_eq!(snap.waits, 1);
        assert_eq!(snap.dropped, 1);
        assert_eq!(snap.finished, 1);
    }
}
