//! Simulation event types.
//!
//! Lightweight value types emitted by the integrator loop, carrying just
//! enough data for monitoring and debugging.

use serde::{Deserialize, Serialize};
use tensile_solver::SolverStatus;

/// A simulation event tagged with its timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Timestep number (0-indexed).
    pub timestep: u32,
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Timestep started.
    TimestepBegin {
        /// Simulation time at the start of the step (seconds).
        sim_time: f64,
    },

    /// Timestep completed.
    TimestepEnd {
        /// Wall-clock time for the entire timestep (seconds).
        wall_time: f64,
    },

    /// One conjugate gradient iteration of the velocity solve.
    SolverIteration {
        /// 0 for the initial residual.
        iteration: u32,
        /// Relative residual.
        residual: f64,
    },

    /// Outcome of the velocity solve for the timestep.
    Convergence {
        iterations: u32,
        final_residual: f64,
        status: SolverStatus,
    },

    /// Kinetic energy `½ Σ m v²` of the committed state.
    Energy { kinetic: f64 },

    /// Custom event for extensibility.
    Custom {
        label: String,
        /// JSON-encoded payload.
        payload: String,
    },
}

impl SimulationEvent {
    /// Creates a new event for the given timestep.
    pub fn new(timestep: u32, kind: EventKind) -> Self {
        Self { timestep, kind }
    }
}
