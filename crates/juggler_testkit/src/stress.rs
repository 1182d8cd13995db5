//! Stress tests for Juggler.
//!
//! Many threads run overlapping read-modify-write transactions against a
//! [`TrailerBackend`], retrying whenever they are dropped. Every write
//! carries the trailer it read plus its own sequence number, so the
//! resulting logs can be checked for serializability with
//! [`verify_chains`].

use crate::chain::{verify_chains, ChainViolation};
use crate::fixtures::{TrailerBackend, TRAILER_LEN};
use juggler_core::{CoreError, CoreResult, Juggler, StatsSnapshot, Transaction};
use juggler_storage::{ResourceBackend, ResourceId};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Configuration for the chain stress test.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of worker threads. Worker `n` touches the resources whose
    /// bits are set in `n`.
    pub workers: usize,
    /// Number of distinct resources (at most 63).
    pub resources: u32,
    /// Whether workers close their read set before writing.
    pub with_limited: bool,
    /// Upper bound of the random pause between operations.
    pub max_jitter: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            workers: 255,
            resources: 4,
            with_limited: false,
            max_jitter: Duration::from_millis(100),
        }
    }
}

/// Result of a stress test run.
#[derive(Debug, Clone, Serialize)]
pub struct StressTestResult {
    /// Transactions that finished successfully.
    pub committed: usize,
    /// Attempts abandoned because the transaction was dropped.
    pub retries: u64,
    /// Records found in the chain logs.
    pub records: usize,
    /// Wall-clock duration in seconds.
    pub elapsed_secs: f64,
    /// Committed transactions per second.
    pub tx_per_second: f64,
    /// Sequencer counters at the end of the run.
    pub stats: StatsSnapshot,
}

impl StressTestResult {
    /// Prints a summary of the test.
    pub fn print_summary(&self, name: &str) {
        println!("\n=== {} ===", name);
        println!("Committed: {}", self.committed);
        println!("Retries: {}", self.retries);
        println!("Chain records: {}", self.records);
        println!("Duration: {:.3}s", self.elapsed_secs);
        println!("Throughput: {:.2} tx/sec", self.tx_per_second);
        println!(
            "Admitted: {} (overtakes: {}), waits: {}, dropped: {}",
            self.stats.admitted, self.stats.overtakes, self.stats.waits, self.stats.dropped
        );
    }
}

/// Errors that end a stress run.
#[derive(Debug, Error)]
pub enum StressError {
    /// A worker failed with something other than a drop.
    #[error("worker {worker} failed: {source}")]
    Worker {
        /// The failing worker.
        worker: usize,
        /// The underlying error.
        source: CoreError,
    },

    /// A worker thread panicked.
    #[error("worker {worker} panicked")]
    Panicked {
        /// The panicking worker.
        worker: usize,
    },

    /// The final logs are not serializable.
    #[error("chain verification failed: {0}")]
    Chain(#[from] ChainViolation),
}

/// Runs `op` in fresh transactions until one finishes without being dropped.
///
/// The transaction is finished after `op` succeeds. Returns the value of the
/// successful attempt and the number of dropped attempts.
pub fn retry_on_dropped<B, T, F>(juggler: &Juggler<B>, mut op: F) -> CoreResult<(T, u64)>
where
    B: ResourceBackend + ?Sized,
    F: FnMut(&mut Transaction<B>) -> CoreResult<T>,
{
    let mut retries = 0;
    loop {
        let mut tx = juggler.begin();
        let outcome = op(&mut tx).and_then(|value| tx.finish().map(|()| value));
        match outcome {
            Ok(value) => return Ok((value, retries)),
            Err(e) if e.is_dropped() => retries += 1,
            Err(e) => return Err(e),
        }
    }
}

/// Sleeps for a random time below `max`, mostly much shorter.
fn jitter(rng: &mut impl Rng, max: Duration) {
    if max.is_zero() {
        return;
    }
    let bound = match rng.gen_range(0..10) {
        0 => max,
        1 => max / 10,
        _ => max / 100,
    };
    let micros = bound.as_micros().max(1) as u64;
    thread::sleep(Duration::from_micros(rng.gen_range(0..micros)));
}

/// Resources selected by the bits of `worker`.
pub fn worker_resources(worker: usize, resources: u32) -> Vec<ResourceId> {
    (0..resources.min(63))
        .filter(|bit| (worker as u64) & (1u64 << bit) != 0)
        .map(u64::from)
        .collect()
}

/// One attempt: read every resource, then append a linked record to each.
fn chain_attempt(
    tx: &mut Transaction<TrailerBackend>,
    ids: &mut [ResourceId],
    config: &StressConfig,
) -> CoreResult<()> {
    let mut rng = rand::thread_rng();
    let mut payloads = HashMap::with_capacity(ids.len());

    ids.shuffle(&mut rng);
    for id in ids.iter() {
        let trailer = tx.read(*id)?;
        payloads.insert(*id, trailer);
        jitter(&mut rng, config.max_jitter);
    }

    if config.with_limited {
        tx.set_limited()?;
    }

    let stamp = tx.seq().to_be_bytes();
    for payload in payloads.values_mut() {
        payload.truncate(TRAILER_LEN);
        payload.extend_from_slice(&stamp);
    }

    ids.shuffle(&mut rng);
    for id in ids.iter() {
        tx.write(*id, &payloads[id])?;
        jitter(&mut rng, config.max_jitter);
    }
    Ok(())
}

/// Runs the chain stress test and verifies the resulting logs.
pub fn stress_chain(config: &StressConfig) -> Result<StressTestResult, StressError> {
    let resources = config.resources.min(63);
    let juggler = Juggler::new(TrailerBackend::seeded(u64::from(resources)));
    let retries = AtomicU64::new(0);
    let start = Instant::now();

    let committed = thread::scope(|scope| {
        let handles: Vec<_> = (1..=config.workers)
            .map(|worker| {
                let juggler = juggler.clone();
                let retries = &retries;
                let handle = scope.spawn(move || {
                    let mut ids = worker_resources(worker, resources);
                    let ((), dropped) =
                        retry_on_dropped(&juggler, |tx| chain_attempt(tx, &mut ids, config))?;
                    retries.fetch_add(dropped, Ordering::Relaxed);
                    Ok::<(), CoreError>(())
                });
                (worker, handle)
            })
            .collect();

        let mut committed = 0;
        for (worker, handle) in handles {
            match handle.join() {
                Ok(Ok(())) => committed += 1,
                Ok(Err(source)) => return Err(StressError::Worker { worker, source }),
                Err(_) => return Err(StressError::Panicked { worker }),
            }
        }
        Ok(committed)
    })?;

    let elapsed = start.elapsed();
    let records = verify_chains(juggler.backend(), u64::from(resources))?;
    let elapsed_secs = elapsed.as_secs_f64();

    Ok(StressTestResult {
        committed,
        retries: retries.load(Ordering::Relaxed),
        records,
        elapsed_secs,
        tx_per_second: if elapsed_secs > 0.0 {
            committed as f64 / elapsed_secs
        } else {
            0.0
        },
        stats: juggler.stats().snapshot(),
    })
}
