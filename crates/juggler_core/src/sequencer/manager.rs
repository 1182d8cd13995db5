//! The sequencer: global ordering authority for transactions.

use super::entry::{ActiveEntry, ActiveList, EntrySnapshot};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::process::ProcessHandle;
use crate::stats::SequencerStats;
use crate::types::{ResourceId, SequenceNumber};
use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use tracing::{debug, trace};

/// State guarded by the sequencer lock.
#[derive(Debug)]
struct SequencerState {
    /// Last sequence number handed out.
    last_seq: u64,
    /// Live transactions in ascending sequence order.
    active: ActiveList,
}

/// Orders transactions and decides when each may write.
///
/// The sequencer provides:
/// - Strictly increasing sequence numbers for new transactions
/// - Tracking of the resources each live transaction has touched
/// - Commit admission in sequence order, with overtaking for transactions
///   that provably cannot conflict with anything earlier
/// - Cascading abort of later transactions that overlap a reported write
///
/// ## Locking
///
/// One mutex guards all state. Commit requests wait on a condition variable
/// tied to that mutex and re-check admission after every wake-up. Every
/// operation that can make a waiter admissible (`set_limited`,
/// `request_commit`, `report_write`, `finish`) wakes all waiters.
///
/// The state-changing operations are only reachable through a
/// [`ProcessHandle`], which owns its sequence number exclusively.
pub struct Sequencer {
    state: Mutex<SequencerState>,
    changed: Condvar,
    stats: SequencerStats,
    touched_capacity: usize,
}

impl Sequencer {
    /// Creates a sequencer with the default configuration.
    pub fn new() -> Self {
        Self::with_config(&Config::default())
    }

    /// Creates a sequencer from `config`.
    pub fn with_config(config: &Config) -> Self {
        Self {
            state: Mutex::new(SequencerState {
                last_seq: config.first_sequence,
                active: ActiveList::with_capacity(config.active_capacity),
            }),
            changed: Condvar::new(),
            stats: SequencerStats::new(),
            touched_capacity: config.touched_capacity,
        }
    }

    /// Opens a new process handle with a fresh sequence number.
    pub fn new_process(self: &Arc<Self>) -> ProcessHandle {
        let seq = self.allocate();
        ProcessHandle::new(Arc::clone(self), seq)
    }

    /// Returns the number of live transactions.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.state.lock().active.len()
    }

    /// Returns true if `seq` is live (neither finished nor dropped).
    #[must_use]
    pub fn is_active(&self, seq: SequenceNumber) -> bool {
        self.state.lock().active.position(seq).is_some()
    }

    /// Returns a copy of the entry for `seq`, if it is live.
    #[must_use]
    pub fn entry(&self, seq: SequenceNumber) -> Option<EntrySnapshot> {
        let state = self.state.lock();
        state
            .active
            .position(seq)
            .map(|index| EntrySnapshot::from(state.active.get(index)))
    }

    /// Returns copies of every live entry in sequence order.
    #[must_use]
    pub fn entries(&self) -> Vec<EntrySnapshot> {
        self.state
            .lock()
            .active
            .iter()
            .map(EntrySnapshot::from)
            .collect()
    }

    /// Returns the sequencer statistics.
    #[must_use]
    pub fn stats(&self) -> &SequencerStats {
        &self.stats
    }

    /// Allocates the next sequence number and registers an empty entry.
    pub(crate) fn allocate(&self) -> SequenceNumber {
        let mut state = self.state.lock();
        state.last_seq += 1;
        let seq = SequenceNumber::new(state.last_seq);
        state
            .active
            .push(ActiveEntry::new(seq, self.touched_capacity));
        self.stats.record_start();
        trace!(%seq, "allocated");
        seq
    }

    /// Records that `seq` has read `id`.
    ///
    /// Re-reading a touched id always succeeds. A new id fails with
    /// [`CoreError::Limited`] once the read set is closed.
    pub(crate) fn register_read(&self, seq: SequenceNumber, id: ResourceId) -> CoreResult<()> {
        let mut state = self.state.lock();
        let index = state
            .active
            .position(seq)
            .ok_or_else(|| CoreError::dropped(seq))?;
        if !state.active.get_mut(index).touch(id) {
            return Err(CoreError::limited(seq, id));
        }
        trace!(%seq, resource = id, "read registered");
        Ok(())
    }

    /// Closes the read set of `seq`.
    pub(crate) fn set_limited(&self, seq: SequenceNumber) -> CoreResult<()> {
        let mut state = self.state.lock();
        let index = state
            .active
            .position(seq)
            .ok_or_else(|| CoreError::dropped(seq))?;
        state.active.get_mut(index).limited = true;
        self.changed.notify_all();
        trace!(%seq, "limited");
        Ok(())
    }

    /// Blocks until `seq` is admitted to write.
    ///
    /// Admission is granted when `seq` is the earliest live transaction, was
    /// already admitted, or may overtake every earlier transaction. Returns
    /// [`CoreError::Dropped`] if `seq` is removed while waiting.
    pub(crate) fn request_commit(&self, seq: SequenceNumber) -> CoreResult<()> {
        let mut state = self.state.lock();
        loop {
            let index = state
                .active
                .position(seq)
                .ok_or_else(|| CoreError::dropped(seq))?;

            if state.active.get(index).committing {
                return Ok(());
            }

            let overtake = index > 0 && state.active.can_overtake(index);
            if index == 0 || overtake {
                state.active.get_mut(index).committing = true;
                self.stats.record_admission(overtake);
                self.changed.notify_all();
                debug!(%seq, overtake, "admitted to commit");
                return Ok(());
            }

            self.stats.record_wait();
            trace!(%seq, position = index, "waiting for commit admission");
            self.changed.wait(&mut state);
        }
    }

    /// Records that `seq` has written `id` and drops conflicting later
    /// transactions.
    ///
    /// Fails with [`CoreError::NotInCharge`] unless `seq` was admitted. Every
    /// later live transaction whose touched set intersects the touched set
    /// of `seq` (including `id`) is removed.
    pub(crate) fn report_write(&self, seq: SequenceNumber, id: ResourceId) -> CoreResult<()> {
        let mut state = self.state.lock();
        let index = state
            .active
            .position(seq)
            .ok_or_else(|| CoreError::dropped(seq))?;

        let entry = state.active.get_mut(index);
        if !entry.committing {
            return Err(CoreError::not_in_charge(seq));
        }
        if !entry.touch(id) {
            return Err(CoreError::limited(seq, id));
        }

        for victim in state.active.cascade(index) {
            self.stats.record_drop();
            debug!(%victim, by = %seq, resource = id, "dropped by conflicting write");
        }
        self.changed.notify_all();
        Ok(())
    }

    /// Removes `seq` from the live set.
    ///
    /// Finishing a transaction that was already dropped succeeds.
    pub(crate) fn finish(&self, seq: SequenceNumber) -> CoreResult<()> {
        let mut state = self.state.lock();
        if let Some(index) = state.active.position(seq) {
            state.active.remove(index);
            self.stats.record_finish();
            self.changed.notify_all();
            trace!(%seq, "finished");
        }
        Ok(())
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("active_count", &self.active_count())
            .field("stats", &self.stats.snapshot())
            .finish_non_exhaustive()
    }
}
