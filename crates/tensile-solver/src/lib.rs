//! # tensile-solver
//!
//! Semi-implicit backward Euler for mass-spring systems (cloth and hair).
//!
//! One timestep runs in four phases:
//!
//! 1. [`ImplicitData::clear_forces`] opens an [`Assembly`] on which the force
//!    kernels accumulate forces and jacobians.
//! 2. [`ImplicitData::clear_constraints`] and the `add_constraint_*` calls
//!    restrict the degrees of freedom of pinned or sliding vertices.
//! 3. [`ImplicitData::solve_velocities`] builds `A = M - dt·dF/dV - dt²·dF/dX`
//!    and runs the filtered conjugate gradient for the velocity change.
//! 4. [`ImplicitData::solve_positions`] and [`ImplicitData::apply_result`]
//!    integrate and commit the new state.
//!
//! ## Key Types
//!
//! - [`ImplicitData`]: per-vertex state, system matrices and solver workspace
//! - [`Assembly`]: per-timestep force accumulation context
//! - [`SolverConfig`]: iteration cap, tolerance, preconditioner
//! - [`SolverResult`]: convergence status, iterations and relative residual

pub mod angular;
pub mod assembly;
pub mod cg;
pub mod config;
pub mod constraints;
pub mod external;
pub mod hair;
pub mod integrate;
pub mod spring;
pub mod state;
pub mod wind;

pub use assembly::Assembly;
pub use cg::{CgIteration, SolverResult, SolverStatus};
pub use config::{Preconditioner, SolverConfig};
pub use spring::{CompressionModel, LinearSpring};
pub use state::ImplicitData;
