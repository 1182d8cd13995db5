//! Fuzz testing harnesses for Juggler.
//!
//! Schedules are executed on a single thread against a reference model of
//! the sequencer. Writes are only issued when the model says admission
//! will not block, so a schedule never deadlocks its own thread. Any
//! divergence from the model panics.

use crate::generators::{TxOperation, SCHEDULE_RESOURCES};
use juggler_core::{CoreError, CoreResult, EntrySnapshot, Juggler, Sequencer, Transaction};
use juggler_storage::{InMemoryBackend, ResourceId};

/// Upper bound on transactions opened by one schedule.
const MAX_SLOTS: usize = 16;

/// Counts of what a schedule actually did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleSummary {
    /// Transactions opened.
    pub opened: usize,
    /// Writes and removes that reached the backend and were reported.
    pub writes: usize,
    /// Writes skipped because admission would block.
    pub skipped_writes: usize,
    /// Transactions dropped by cascades.
    pub dropped: usize,
}

/// Fuzz target for arbitrary schedules.
///
/// Every three bytes decode to one [`TxOperation`].
pub fn fuzz_schedule(data: &[u8]) {
    let ops: Vec<_> = data
        .chunks_exact(3)
        .map(|c| TxOperation::from_bytes([c[0], c[1], c[2]]))
        .collect();
    let _ = execute_schedule(&ops);
}

/// Whether `entries[index]` would be admitted without waiting.
fn model_admits(entries: &[EntrySnapshot], index: usize) -> bool {
    let candidate = &entries[index];
    if index == 0 || candidate.committing {
        return true;
    }
    candidate.limited
        && entries[..index].iter().all(|earlier| {
            earlier.limited && !earlier.touched.iter().any(|id| candidate.touched.contains(id))
        })
}

/// Later entries that a write of `id` by `entries[index]` must drop.
fn model_victims(entries: &[EntrySnapshot], index: usize, id: ResourceId) -> Vec<u64> {
    let mut touched = entries[index].touched.clone();
    if !touched.contains(&id) {
        touched.push(id);
    }
    entries[index + 1..]
        .iter()
        .filter(|later| later.touched.iter().any(|t| touched.contains(t)))
        .map(|later| later.seq.as_u64())
        .collect()
}

fn check_invariants(sequencer: &Sequencer) {
    let entries = sequencer.entries();
    assert!(
        entries.windows(2).all(|w| w[0].seq < w[1].seq),
        "active entries out of order: {entries:?}"
    );
    for entry in &entries {
        assert!(
            entry.touched.windows(2).all(|w| w[0] < w[1]),
            "touched set not sorted: {entry:?}"
        );
    }
}

/// Treats a missing resource as success; registration precedes the backend.
fn registered(result: CoreResult<Vec<u8>>) -> CoreResult<()> {
    match result {
        Ok(_) => Ok(()),
        Err(CoreError::Storage(e)) if e.is_not_found() => Ok(()),
        Err(e) => Err(e),
    }
}

fn expect_dropped_or_finished(tx: &Transaction<InMemoryBackend>, result: CoreResult<()>) {
    if tx.is_finished() {
        assert!(matches!(result, Err(CoreError::Finished { .. })), "{result:?}");
    } else {
        assert!(matches!(result, Err(CoreError::Dropped { .. })), "{result:?}");
    }
}

/// Runs `ops` and checks every outcome against the model.
///
/// # Panics
///
/// Panics if the engine diverges from the model.
pub fn execute_schedule(ops: &[TxOperation]) -> ScheduleSummary {
    let juggler = Juggler::new(InMemoryBackend::with_data(
        (0..SCHEDULE_RESOURCES).map(|id| (id, Vec::new())),
    ));
    let sequencer = juggler.sequencer().clone();
    let mut txs: Vec<Transaction<InMemoryBackend>> = Vec::new();
    let mut summary = ScheduleSummary::default();

    for op in ops {
        if let TxOperation::Begin = op {
            if txs.len() < MAX_SLOTS {
                txs.push(juggler.begin());
                summary.opened += 1;
            }
            check_invariants(&sequencer);
            continue;
        }
        if txs.is_empty() {
            continue;
        }

        let entries = sequencer.entries();
        let slot = match *op {
            TxOperation::Read { slot, .. }
            | TxOperation::SetLimited { slot }
            | TxOperation::Write { slot, .. }
            | TxOperation::Remove { slot, .. }
            | TxOperation::Finish { slot } => slot % txs.len(),
            TxOperation::Begin => continue,
        };
        let tx = &mut txs[slot];
        let index = entries.iter().position(|e| e.seq == tx.seq());

        match *op {
            TxOperation::Read { id, .. } => {
                let result = registered(tx.read(id));
                match index {
                    Some(i) if entries[i].limited && !entries[i].touched.contains(&id) => {
                        assert!(matches!(result, Err(CoreError::Limited { .. })), "{result:?}");
                    }
                    Some(_) => assert!(result.is_ok(), "{result:?}"),
                    None => expect_dropped_or_finished(tx, result),
                }
            }
            TxOperation::SetLimited { .. } => {
                let result = tx.set_limited();
                match index {
                    Some(_) => assert!(result.is_ok(), "{result:?}"),
                    None => expect_dropped_or_finished(tx, result),
                }
            }
            TxOperation::Write { id, .. } | TxOperation::Remove { id, .. } => {
                let Some(i) = index else {
                    let result = tx.write(id, b"x");
                    expect_dropped_or_finished(tx, result);
                    continue;
                };
                if !model_admits(&entries, i) {
                    summary.skipped_writes += 1;
                    continue;
                }
                let victims = model_victims(&entries, i, id);
                let stamp = tx.seq().to_be_bytes();
                let result = if matches!(op, TxOperation::Write { .. }) {
                    tx.write(id, &stamp)
                } else {
                    tx.remove(id)
                };
                if entries[i].limited && !entries[i].touched.contains(&id) {
                    assert!(matches!(result, Err(CoreError::Limited { .. })), "{result:?}");
                    continue;
                }
                assert!(result.is_ok(), "{result:?}");
                summary.writes += 1;

                let after = sequencer.entries();
                for later in &entries[i + 1..] {
                    let gone = !after.iter().any(|e| e.seq == later.seq);
                    let expected = victims.contains(&later.seq.as_u64());
                    assert_eq!(gone, expected, "cascade mismatch for {later:?}");
                }
                summary.dropped += victims.len();
            }
            TxOperation::Finish { .. } => {
                assert!(tx.finish().is_ok());
                assert!(!sequencer.is_active(tx.seq()));
            }
            TxOperation::Begin => {}
        }
        check_invariants(&sequencer);
    }

    summary
}
