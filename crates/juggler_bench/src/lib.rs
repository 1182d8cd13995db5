//! Benchmark utilities.

use juggler_core::{CoreResult, Juggler};
use juggler_storage::{ResourceBackend, ResourceId};
use juggler_testkit::retry_on_dropped;
use rand::Rng;
use std::thread;
use std::time::{Duration, Instant};

/// Generate random payload data of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// One read-limit-write transaction on `id`, retried until it commits.
///
/// The read set is closed before writing, so transactions on distinct
/// resources can overtake each other. Returns the number of dropped attempts.
pub fn read_write<B>(juggler: &Juggler<B>, id: ResourceId, payload: &[u8]) -> CoreResult<u64>
where
    B: ResourceBackend + ?Sized,
{
    let ((), retries) = retry_on_dropped(juggler, |tx| {
        tx.read(id)?;
        tx.set_limited()?;
        tx.write(id, payload)
    })?;
    Ok(retries)
}

/// Runs `iters` transactions spread over `threads` threads and returns the
/// wall-clock time taken.
///
/// Thread `t` uses the resource returned by `resource(t)`.
pub fn run_parallel<B>(
    juggler: &Juggler<B>,
    threads: usize,
    iters: u64,
    resource: impl Fn(usize) -> ResourceId + Sync,
) -> Duration
where
    B: ResourceBackend + ?Sized,
{
    let per_thread = iters.div_ceil(threads.max(1) as u64);
    let payload = random_data(64);
    let start = Instant::now();
    thread::scope(|scope| {
        for t in 0..threads {
            let juggler = juggler.clone();
            let payload = &payload;
            let resource = &resource;
            scope.spawn(move || {
                let id = resource(t);
                for _ in 0..per_thread {
                    if let Err(e) = read_write(&juggler, id, payload) {
                        panic!("benchmark transaction failed: {e}");
                    }
                }
            });
        }
    });
    start.elapsed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use juggler_testkit::NullBackend;

    #[test]
    fn read_write_overtakes_disjoint_limited() {
        let juggler = Juggler::new(NullBackend);
        let mut earlier = juggler.begin();
        earlier.read(100).unwrap();
        earlier.set_limited().unwrap();

        // Would block forever behind `earlier` without overtaking
        assert_eq!(read_write(&juggler, 1, b"x").unwrap(), 0);
        assert_eq!(juggler.stats().overtakes(), 1);
        earlier.finish().unwrap();
    }

    #[test]
    fn run_parallel_no_conflicts_completes() {
        let juggler = Juggler::new(NullBackend);
        run_parallel(&juggler, 4, 64, |t| t as u64);
        let stats = juggler.stats().snapshot();
        assert_eq!(stats.admitted, 64);
        assert_eq!(stats.dropped, 0);
        assert_eq!(juggler.active_count(), 0);
    }
}
