//! CLI command implementations.

pub mod stress;
