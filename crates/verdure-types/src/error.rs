//! Error types for the Verdure solver.
//!
//! All crates return `VerdureResult<T>` from fallible operations.

use thiserror::Error;

/// Unified error type for the Verdure solver.
#[derive(Debug, Error)]
pub enum VerdureError {
    /// A constructor or operation received an out-of-range argument
    /// (non-positive mass or radius, inverted bounds, bad particle index).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Particle source connectivity is malformed.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// A geometric quantity collapsed (e.g. normalizing a zero-length vector).
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A constraint lifecycle transition did not match the body's lists.
    #[error("Inconsistent state: {0}")]
    InconsistentState(String),

    /// A simulation invariant was violated (e.g. NaN positions after integration).
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, VerdureError>`.
pub type VerdureResult<T> = Result<T, VerdureError>;
