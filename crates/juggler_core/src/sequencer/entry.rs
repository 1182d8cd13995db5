//! Active transaction entries and the ordered list that holds them.

use super::touched::TouchedSet;
use crate::types::{ResourceId, SequenceNumber};

/// Sequencer-side state of one live transaction.
#[derive(Debug, Clone)]
pub(crate) struct ActiveEntry {
    /// Immutable position in the global order.
    pub(crate) seq: SequenceNumber,
    /// Resources read or written so far.
    pub(crate) touched: TouchedSet,
    /// Read set closed; never reset.
    pub(crate) limited: bool,
    /// Admitted to write; never reset.
    pub(crate) committing: bool,
}

impl ActiveEntry {
    pub(crate) fn new(seq: SequenceNumber, touched_capacity: usize) -> Self {
        Self {
            seq,
            touched: TouchedSet::with_capacity(touched_capacity),
            limited: false,
            committing: false,
        }
    }

    /// Adds `id` to the touched set unless the set is closed.
    ///
    /// Already touched ids are accepted even when limited. Returns false if
    /// `id` is new and the entry is limited.
    pub(crate) fn touch(&mut self, id: ResourceId) -> bool {
        if self.touched.contains(id) {
            return true;
        }
        if self.limited {
            return false;
        }
        self.touched.insert(id);
        true
    }
}

/// Point-in-time copy of an active entry, for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntrySnapshot {
    /// Sequence number of the transaction.
    pub seq: SequenceNumber,
    /// Touched resources in ascending order.
    pub touched: Vec<ResourceId>,
    /// Whether the read set is closed.
    pub limited: bool,
    /// Whether the transaction has been admitted to write.
    pub committing: bool,
}

impl From<&ActiveEntry> for EntrySnapshot {
    fn from(entry: &ActiveEntry) -> Self {
        Self {
            seq: entry.seq,
            touched: entry.touched.as_slice().to_vec(),
            limited: entry.limited,
            committing: entry.committing,
        }
    }
}

/// Live entries, kept sorted by ascending sequence number.
///
/// Entries are only ever appended with a fresh, larger sequence number, so
/// pushing preserves the order and lookups can binary search.
#[derive(Debug, Default)]
pub(crate) struct ActiveList {
    entries: Vec<ActiveEntry>,
}

impl ActiveList {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, entry: ActiveEntry) {
        debug_assert!(self.entries.last().is_none_or(|last| last.seq < entry.seq));
        self.entries.push(entry);
    }

    /// Returns the index of the entry for `seq`, if it is still active.
    pub(crate) fn position(&self, seq: SequenceNumber) -> Option<usize> {
        self.entries.binary_search_by_key(&seq, |e| e.seq).ok()
    }

    pub(crate) fn get(&self, index: usize) -> &ActiveEntry {
        &self.entries[index]
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> &mut ActiveEntry {
        &mut self.entries[index]
    }

    pub(crate) fn remove(&mut self, index: usize) -> ActiveEntry {
        self.entries.remove(index)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &ActiveEntry> {
        self.entries.iter()
    }

    /// Whether the entry at `index` may commit ahead of every earlier entry.
    ///
    /// Requires the entry and every earlier entry to be limited, and no
    /// earlier touched set to intersect this one.
    pub(crate) fn can_overtake(&self, index: usize) -> bool {
        let candidate = &self.entries[index];
        if !candidate.limited {
            return false;
        }
        self.entries[..index]
            .iter()
            .all(|earlier| earlier.limited && !earlier.touched.intersects(&candidate.touched))
    }

    /// Removes every entry after `index` whose touched set intersects the
    /// entry at `index`. Returns the removed sequence numbers, latest first.
    pub(crate) fn cascade(&mut self, index: usize) -> Vec<SequenceNumber> {
        let mut victims = Vec::new();
        let mut i = self.entries.len();
        while i > index + 1 {
            i -= 1;
            if self.entries[index]
                .touched
                .intersects(&self.entries[i].touched)
            {
                victims.push(self.entries.remove(i).seq);
            }
        }
        victims
    }
}
