//! # tensile-types
//!
//! Shared types, identifiers, error types, and solver constants
//! for the tensile implicit mass-spring solver.
//!
//! This crate has zero domain logic. It defines the vocabulary
//! that all other tensile crates share.

pub mod constants;
pub mod error;
pub mod ids;

pub use error::{TensileError, TensileResult};
pub use ids::BlockId;
