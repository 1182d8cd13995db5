//! Sorted, duplicate-free set of touched resources.

use crate::types::ResourceId;

/// The resources a transaction has read or written.
///
/// Backed by a sorted `Vec`: per-transaction footprints are small, so binary
/// search plus in-place insertion beats a tree. Members are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchedSet {
    ids: Vec<ResourceId>,
}

impl TouchedSet {
    /// Creates an empty set with room for `capacity` ids.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
        }
    }

    /// Returns the insertion point for `id`, or `Ok` if it is present.
    fn search(&self, id: ResourceId) -> Result<usize, usize> {
        self.ids.binary_search(&id)
    }

    /// Returns true if `id` has been touched.
    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.search(id).is_ok()
    }

    /// Inserts `id`, keeping the set sorted. Returns false if already present.
    pub fn insert(&mut self, id: ResourceId) -> bool {
        match self.search(id) {
            Ok(_) => false,
            Err(at) => {
                self.ids.insert(at, id);
                true
            }
        }
    }

    /// Returns true if the two sets share at least one id.
    ///
    /// Sorted-merge walk, linear in the combined length.
    #[must_use]
    pub fn intersects(&self, other: &TouchedSet) -> bool {
        let (mut i, mut j) = (0, 0);
        while i < self.ids.len() && j < other.ids.len() {
            match self.ids[i].cmp(&other.ids[j]) {
                std::cmp::Ordering::Equal => return true,
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
            }
        }
        false
    }

    /// Returns the ids in ascending order.
    #[must_use]
    pub fn as_slice(&self) -> &[ResourceId] {
        &self.ids
    }

    /// Returns the number of touched ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing has been touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl FromIterator<ResourceId> for TouchedSet {
    fn from_iter<I: IntoIterator<Item = ResourceId>>(iter: I) -> Self {
        let mut set = Self::default();
        for id in iter {
            set.insert(id);
        }
        set
    }
}
