//! Integration step: velocity solve, position update, commit.
//!
//! ```text
//! A = M - dt·dF/dV - dt²·dF/dX
//! B = dt·F + dt²·(dF/dX · V)
//! A·dV = B            (filtered PCG)
//! Vnew = V + dV
//! Xnew = X + dt·Vnew
//! ```
//!
//! The three calls are strictly sequential: positions read the solved
//! velocities and the commit reads both.

use std::time::Instant;

use tensile_math::lfvector;

use crate::cg::{self, CgIteration, SolverResult, SolverStatus};
use crate::state::ImplicitData;

impl ImplicitData {
    /// Assembles and solves the implicit system for the new velocities.
    ///
    /// Never fails: malformed calls and solver trouble are reported through
    /// [`SolverResult::status`].
    pub fn solve_velocities(&mut self, dt: f32) -> SolverResult {
        self.solve_velocities_with(dt, |_| {})
    }

    /// As [`solve_velocities`](Self::solve_velocities), reporting every
    /// conjugate gradient iteration to `observer`.
    pub fn solve_velocities_with(
        &mut self,
        dt: f32,
        mut observer: impl FnMut(CgIteration),
    ) -> SolverResult {
        if !(dt.is_finite() && dt > 0.0) {
            tracing::warn!(dt, "rejecting velocity solve with invalid timestep");
            return SolverResult::invalid_input();
        }

        let start = Instant::now();

        self.a
            .assign_sub_scaled(&self.mass, &self.dfdv, dt, &self.dfdx, dt * dt);

        // B = F·dt + (dF/dX·V)·dt²
        let ws = &mut self.workspace;
        self.dfdx.mul_vector(&self.v, &mut ws.product, &mut ws.scratch);
        lfvector::add_scaled2(&mut self.b, &self.f, dt, &ws.product, dt * dt);

        let result = cg::solve_filtered(
            &self.a,
            &self.b,
            &self.z,
            &self.s,
            &mut self.dv,
            &mut self.workspace,
            &self.config,
            &mut observer,
        );

        lfvector::add(&mut self.v_new, &self.v, &self.dv);

        match result.status {
            SolverStatus::Success => tracing::debug!(
                iterations = result.iterations,
                error = result.error,
                elapsed_us = start.elapsed().as_micros() as u64,
                "velocity solve converged"
            ),
            SolverStatus::NoConvergence => tracing::warn!(
                iterations = result.iterations,
                error = result.error,
                "velocity solve hit the iteration cap"
            ),
            status => tracing::warn!(
                ?status,
                iterations = result.iterations,
                "velocity solve reported a numerical issue"
            ),
        }

        result
    }

    /// `Xnew = X + Vnew·dt`.
    pub fn solve_positions(&mut self, dt: f32) {
        lfvector::add_scaled(&mut self.x_new, &self.x, &self.v_new, dt);
    }

    /// Commits `Xnew → X` and `Vnew → V`.
    pub fn apply_result(&mut self) {
        lfvector::copy(&mut self.x, &self.x_new);
        lfvector::copy(&mut self.v, &self.v_new);
    }

    /// Kinetic energy `½ Σ vᵀ M v` of the committed state.
    pub fn kinetic_energy(&self) -> f32 {
        self.v
            .iter()
            .enumerate()
            .map(|(i, &v)| 0.5 * v.dot(*self.mass.diag(i) * v))
            .sum()
    }
}
