//! Property-based test generators using proptest.
//!
//! Provides strategies for generating resource sets and interleaved
//! single-threaded transaction schedules.

use juggler_storage::ResourceId;
use proptest::prelude::*;

/// Number of distinct resources used by generated schedules.
pub const SCHEDULE_RESOURCES: u64 = 8;

/// Strategy for generating resource ids below `max`.
pub fn resource_id_strategy(max: ResourceId) -> impl Strategy<Value = ResourceId> + Clone {
    0..max.max(1)
}

/// Strategy for generating sorted, duplicate-free resource sets.
pub fn resource_set_strategy(
    max: ResourceId,
    max_len: usize,
) -> impl Strategy<Value = Vec<ResourceId>> {
    prop::collection::btree_set(resource_id_strategy(max), 0..=max_len)
        .prop_map(|set| set.into_iter().collect())
}

/// One step of a single-threaded transaction schedule.
///
/// `slot` picks one of the transactions opened so far (modulo their count).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOperation {
    /// Open a new transaction.
    Begin,
    /// Read a resource.
    Read {
        /// Transaction slot.
        slot: usize,
        /// Resource to read.
        id: ResourceId,
    },
    /// Close the read set.
    SetLimited {
        /// Transaction slot.
        slot: usize,
    },
    /// Write a resource, if admission would not block.
    Write {
        /// Transaction slot.
        slot: usize,
        /// Resource to write.
        id: ResourceId,
    },
    /// Delete a resource, if admission would not block.
    Remove {
        /// Transaction slot.
        slot: usize,
        /// Resource to delete.
        id: ResourceId,
    },
    /// Finish the transaction.
    Finish {
        /// Transaction slot.
        slot: usize,
    },
}

impl TxOperation {
    /// Decodes an operation from three fuzz bytes.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 3]) -> Self {
        let slot = usize::from(bytes[1]);
        let id = u64::from(bytes[2]) % SCHEDULE_RESOURCES;
        match bytes[0] % 6 {
            0 => Self::Begin,
            1 => Self::Read { slot, id },
            2 => Self::SetLimited { slot },
            3 => Self::Write { slot, id },
            4 => Self::Remove { slot, id },
            _ => Self::Finish { slot },
        }
    }
}

/// Strategy for generating schedule operations.
pub fn tx_operation_strategy() -> impl Strategy<Value = TxOperation> {
    let slot = 0usize..8;
    let id = resource_id_strategy(SCHEDULE_RESOURCES);
    prop_oneof![
        2 => Just(TxOperation::Begin),
        4 => (slot.clone(), id.clone()).prop_map(|(slot, id)| TxOperation::Read { slot, id }),
        1 => slot.clone().prop_map(|slot| TxOperation::SetLimited { slot }),
        3 => (slot.clone(), id.clone()).prop_map(|(slot, id)| TxOperation::Write { slot, id }),
        1 => (slot.clone(), id).prop_map(|(slot, id)| TxOperation::Remove { slot, id }),
        1 => slot.prop_map(|slot| TxOperation::Finish { slot }),
    ]
}

/// Strategy for generating a schedule.
pub fn schedule_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<TxOperation>> {
    prop::collection::vec(tx_operation_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a configuration for thorough tests.
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            cases: 1024,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
