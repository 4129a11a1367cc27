//! # verdure-types
//!
//! Shared identifiers, error types, and simulation constants
//! for the Verdure position-based dynamics solver.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other Verdure crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{VerdureError, VerdureResult};
pub use ids::{BodyId, ConstraintId, ExternalBodyId};
