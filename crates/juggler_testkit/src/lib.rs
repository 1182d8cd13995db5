//! # Juggler Testkit
//!
//! Test utilities for Juggler.
//!
//! This crate provides:
//! - Test backends ([`TrailerBackend`], [`NullBackend`])
//! - Serializability checks over append-only chain logs
//! - Property-based test generators using proptest
//! - A model-checked schedule fuzzer
//! - The multi-threaded chain stress harness
//!
//! ## Usage
//!
//! ```rust,ignore
//! use juggler_testkit::prelude::*;
//!
//! #[test]
//! fn chain_stays_serializable() {
//!     let result = stress_chain(&StressConfig::default()).unwrap();
//!     result.print_summary("chain");
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod chain;
pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod stress;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::chain::*;
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::stress::*;
}

pub use chain::*;
pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use stress::*;
