//! Error types for the tensile solver.
//!
//! Construction and configuration return `TensileResult<T>`. Linear solves
//! report through `SolverStatus` instead and never fail with an error.

use thiserror::Error;

/// Unified error type for the tensile crates.
#[derive(Debug, Error)]
pub enum TensileError {
    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input data is malformed or inconsistent (sizes, indices, non-finite values).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// More off-diagonal blocks were requested than the solver was sized for.
    #[error("Block capacity exceeded: {requested} blocks requested, capacity is {capacity}")]
    CapacityExceeded {
        requested: usize,
        capacity: usize,
    },

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, TensileError>`.
pub type TensileResult<T> = Result<T, TensileError>;
