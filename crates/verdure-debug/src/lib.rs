//! # verdure-debug
//!
//! State snapshots for debugging simulation issues. A snapshot captures
//! every body's particles and constraint lifecycle at one timestep and
//! serializes to a compact binary file for later inspection.

pub mod snapshot;

pub use snapshot::{BodySnapshot, StateSnapshot};
