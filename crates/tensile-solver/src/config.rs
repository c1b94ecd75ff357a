//! Solver configuration.
//!
//! Parameters that control the conjugate gradient: iteration cap, relative
//! tolerance, preconditioner, and the vertex count above which the sparse
//! product splits into concurrent passes.

use serde::{Deserialize, Serialize};
use tensile_types::constants::{
    DEFAULT_CG_EPSILON, DEFAULT_CG_ITERATIONS, GRAVITY, PARALLEL_VERTEX_THRESHOLD,
};
use tensile_types::{TensileError, TensileResult};

/// Preconditioner applied to the residual inside the conjugate gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preconditioner {
    /// No preconditioning.
    #[default]
    Identity,
    /// Inverse of each 3×3 diagonal block of the system matrix.
    BlockJacobi,
}

/// Configuration for the implicit solver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Conjugate gradient iteration cap per timestep.
    pub max_iterations: u32,

    /// Relative tolerance on the filtered residual.
    /// The solve stops once `|r|² <= epsilon² · |filter(B)|²`.
    pub epsilon: f32,

    /// Residual preconditioner.
    pub preconditioner: Preconditioner,

    /// Vertex count above which the matrix-vector product runs its two
    /// passes concurrently.
    pub parallel_threshold: usize,

    /// Gravity vector [gx, gy, gz] in m/s², world frame.
    /// Not applied automatically; read by scenarios that add gravity.
    pub gravity: [f32; 3],
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_CG_ITERATIONS,
            epsilon: DEFAULT_CG_EPSILON,
            preconditioner: Preconditioner::Identity,
            parallel_threshold: PARALLEL_VERTEX_THRESHOLD,
            gravity: [0.0, -GRAVITY, 0.0],
        }
    }
}

impl SolverConfig {
    /// Creates a config for debugging (few iterations, loose tolerance).
    pub fn debug() -> Self {
        Self {
            max_iterations: 10,
            epsilon: 0.1,
            ..Default::default()
        }
    }

    /// Creates a high-quality config (more iterations, tighter tolerance,
    /// block-Jacobi preconditioning).
    pub fn high_quality() -> Self {
        Self {
            max_iterations: 500,
            epsilon: 1e-4,
            preconditioner: Preconditioner::BlockJacobi,
            ..Default::default()
        }
    }

    /// Rejects configurations the solver cannot run with.
    pub fn validate(&self) -> TensileResult<()> {
        if self.max_iterations == 0 {
            return Err(TensileError::InvalidConfig(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(TensileError::InvalidConfig(format!(
                "epsilon must be finite and positive, got {}",
                self.epsilon
            )));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(TensileError::InvalidConfig(
                "gravity must be finite".into(),
            ));
        }
        Ok(())
    }
}
