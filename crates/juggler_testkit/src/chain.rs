//! Verification of append-only write chains.
//!
//! A chain log is a 16-byte seed followed by 16-byte records. Each record is
//! the 8-byte trailer its writer read, then the writer's own 8-byte
//! big-endian sequence number. In a serializable history every record links
//! to the one before it and the linked values never decrease.

use crate::fixtures::{TrailerBackend, TRAILER_LEN};
use juggler_storage::ResourceId;
use thiserror::Error;

const RECORD_LEN: usize = 2 * TRAILER_LEN;

/// A violation found in a chain log.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainViolation {
    /// The resource has no log at all.
    #[error("resource {resource} has no log")]
    Missing {
        /// The resource checked.
        resource: ResourceId,
    },

    /// The log is not a seed followed by whole records.
    #[error("resource {resource} log has malformed length {len}")]
    Malformed {
        /// The resource checked.
        resource: ResourceId,
        /// The log length in bytes.
        len: usize,
    },

    /// A record did not read the trailer written before it.
    #[error("broken chain on resource {resource} at byte {offset}: expected {expected}, found {found}")]
    Broken {
        /// The resource checked.
        resource: ResourceId,
        /// Byte offset of the offending record.
        offset: usize,
        /// Trailer of the previous record.
        expected: u64,
        /// Trailer the record claims to have read.
        found: u64,
    },

    /// A record linked back to an earlier transaction.
    #[error("reversed chain on resource {resource} at byte {offset}: {found} after {previous}")]
    Reversed {
        /// The resource checked.
        resource: ResourceId,
        /// Byte offset of the offending record.
        offset: usize,
        /// The previous linked value.
        previous: u64,
        /// The linked value found.
        found: u64,
    },
}

fn word(log: &[u8], at: usize) -> u64 {
    let mut bytes = [0u8; TRAILER_LEN];
    bytes.copy_from_slice(&log[at..at + TRAILER_LEN]);
    u64::from_be_bytes(bytes)
}

/// Checks one chain log.
///
/// Returns the number of records on success.
pub fn verify_chain(resource: ResourceId, log: &[u8]) -> Result<usize, ChainViolation> {
    if log.len() < RECORD_LEN || (log.len() - RECORD_LEN) % RECORD_LEN != 0 {
        return Err(ChainViolation::Malformed {
            resource,
            len: log.len(),
        });
    }

    let mut previous = 0u64;
    let mut at = TRAILER_LEN;
    while at + RECORD_LEN <= log.len() {
        let expected = word(log, at);
        let found = word(log, at + TRAILER_LEN);
        if found != expected {
            return Err(ChainViolation::Broken {
                resource,
                offset: at + TRAILER_LEN,
                expected,
                found,
            });
        }
        if found < previous {
            return Err(ChainViolation::Reversed {
                resource,
                offset: at + TRAILER_LEN,
                previous,
                found,
            });
        }
        previous = found;
        at += RECORD_LEN;
    }

    Ok((log.len() - RECORD_LEN) / RECORD_LEN)
}

/// Checks the chain logs of resources `0..resources`.
///
/// Returns the total number of records on success.
pub fn verify_chains(backend: &TrailerBackend, resources: u64) -> Result<usize, ChainViolation> {
    let mut records = 0;
    for resource in 0..resources {
        let log = backend
            .log(resource)
            .ok_or(ChainViolation::Missing { resource })?;
        records += verify_chain(resource, &log)?;
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(was: u64, seq: u64) -> Vec<u8> {
        [was.to_be_bytes(), seq.to_be_bytes()].concat()
    }

    fn log(records: &[(u64, u64)]) -> Vec<u8> {
        let mut log = vec![0u8; RECORD_LEN];
        for (was, seq) in records {
            log.extend(record(*was, *seq));
        }
        log
    }

    #[test]
    fn seed_only_is_valid() {
        assert_eq!(verify_chain(0, &log(&[])), Ok(0));
    }

    #[test]
    fn linked_records_are_valid() {
        assert_eq!(verify_chain(0, &log(&[(0, 3), (3, 7), (7, 9)])), Ok(3));
    }

    #[test]
    fn broken_link_detected() {
        let result = verify_chain(2, &log(&[(0, 3), (4, 7)]));
        assert_eq!(
            result,
            Err(ChainViolation::Broken {
                resource: 2,
                offset: 32,
                expected: 3,
                found: 4,
            })
        );
    }

    #[test]
    fn malformed_length_detected() {
        let mut bad = log(&[(0, 1)]);
        bad.push(0);
        assert!(matches!(
            verify_chain(1, &bad),
            Err(ChainViolation::Malformed { len: 33, .. })
        ));
        assert!(matches!(
            verify_chain(1, &[0u8; 8]),
            Err(ChainViolation::Malformed { .. })
        ));
    }

    #[test]
    fn reversed_link_detected() {
        let bad = log(&[(0, 5), (5, 1), (1, 1)]);
        assert_eq!(
            verify_chain(0, &bad),
            Err(ChainViolation::Reversed {
                resource: 0,
                offset: 48,
                previous: 5,
                found: 1,
            })
        );
    }

    #[test]
    fn verify_chains_reports_missing() {
        let backend = TrailerBackend::seeded(2);
        assert_eq!(verify_chains(&backend, 2), Ok(0));
        assert_eq!(
            verify_chains(&backend, 3),
            Err(ChainViolation::Missing { resource: 2 })
        );
    }
}
