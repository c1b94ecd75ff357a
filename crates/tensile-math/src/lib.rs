//! # tensile-math
//!
//! Linear algebra primitives for the tensile implicit solver.
//!
//! Provides:
//! - Re-exports of `glam` types (`Vec3`, `Mat3`) used as the 3-vector and 3×3 block
//! - Block helpers (outer products, cross-product matrices, fused scaled updates)
//! - Long-vector operations over per-vertex `Vec3` arrays
//! - The symmetric sparse block matrix (one diagonal block per vertex,
//!   one off-diagonal block per spring) and its matrix-vector product
//! - A `faer`-backed direct solver used as a reference for the iterative solve

pub mod block;
pub mod direct;
pub mod lfvector;
pub mod sparse;

pub use sparse::{Block, BlockMatrix};

// Re-export glam types as the canonical math types for tensile.
pub use glam::{Mat3, Vec3};
