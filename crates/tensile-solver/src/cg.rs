//! Filtered preconditioned conjugate gradient.
//!
//! Solves `A·dV = B` restricted to the free subspace of each vertex. The
//! solution starts at the constraint seed `z`; every residual and search
//! direction is passed through the per-vertex projection so the locked
//! components never move away from the seed.
//!
//! Termination: success once `r·P⁻¹r <= ε²·|filter(B)|²`, no convergence at
//! the iteration cap, numerical issue when the curvature `c·A·c` stops being
//! positive or a value turns non-finite.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use tensile_math::{BlockMatrix, lfvector};

use crate::config::{Preconditioner, SolverConfig};
use crate::constraints::filter;

/// Outcome of a linear solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolverStatus {
    Success,
    /// Inputs or intermediate values broke the solver's preconditions
    /// (non-finite values, non-positive curvature).
    NumericalIssue,
    /// The iteration cap was reached before the tolerance was met.
    NoConvergence,
    /// Malformed call, e.g. a non-positive timestep.
    InvalidInput,
}

/// Result record of one velocity solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverResult {
    pub status: SolverStatus,
    /// Conjugate gradient iterations performed.
    pub iterations: u32,
    /// Final relative residual `sqrt(r·P⁻¹r / |filter(B)|²)`; absolute when
    /// `filter(B)` is zero.
    pub error: f32,
}

impl SolverResult {
    pub(crate) fn invalid_input() -> Self {
        Self {
            status: SolverStatus::InvalidInput,
            iterations: 0,
            error: f32::INFINITY,
        }
    }

    /// True for [`SolverStatus::Success`].
    pub fn converged(&self) -> bool {
        self.status == SolverStatus::Success
    }
}

/// Progress report passed to the iteration observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CgIteration {
    /// 0 for the initial residual, then one per iteration.
    pub iteration: u32,
    /// Relative residual after this iteration.
    pub residual: f32,
}

/// Scratch vectors reused across solves.
#[derive(Debug, Clone)]
pub(crate) struct CgWorkspace {
    /// Filtered right-hand side.
    fb: Vec<Vec3>,
    r: Vec<Vec3>,
    /// Search direction.
    c: Vec<Vec3>,
    q: Vec<Vec3>,
    /// Preconditioned residual.
    s: Vec<Vec3>,
    pub(crate) scratch: Vec<Vec3>,
    pub(crate) product: Vec<Vec3>,
    p_inv: Vec<Mat3>,
}

impl CgWorkspace {
    pub(crate) fn new(n: usize) -> Self {
        Self {
            fb: lfvector::zeroed(n),
            r: lfvector::zeroed(n),
            c: lfvector::zeroed(n),
            q: lfvector::zeroed(n),
            s: lfvector::zeroed(n),
            scratch: lfvector::zeroed(n),
            product: lfvector::zeroed(n),
            p_inv: vec![Mat3::IDENTITY; n],
        }
    }

    /// Fills the block-Jacobi inverse from A's diagonal; singular blocks fall
    /// back to identity.
    fn build_block_jacobi(&mut self, a: &BlockMatrix) {
        for (p, d) in self.p_inv.iter_mut().zip(a.diagonal_blocks()) {
            let det = d.m.determinant();
            *p = if det.is_finite() && det.abs() > f32::MIN_POSITIVE {
                d.m.inverse()
            } else {
                Mat3::IDENTITY
            };
        }
    }
}

/// `to = P⁻¹ r`
fn precondition(kind: Preconditioner, p_inv: &[Mat3], r: &[Vec3], to: &mut [Vec3]) {
    match kind {
        Preconditioner::Identity => lfvector::copy(to, r),
        Preconditioner::BlockJacobi => {
            for ((t, p), &r) in to.iter_mut().zip(p_inv).zip(r) {
                *t = *p * r;
            }
        }
    }
}

/// `sqrt(delta / |filter(B)|²)`, or the absolute `sqrt(delta)` when the
/// filtered right-hand side vanishes.
fn relative_residual(delta: f32, bnorm2: f32) -> f32 {
    if bnorm2 > 0.0 {
        (delta / bnorm2).sqrt()
    } else {
        delta.max(0.0).sqrt()
    }
}

/// Runs the filtered PCG on `A·dv = b`, seeding `dv` from `z` and
/// projecting through `s`.
///
/// Always returns within `config.max_iterations` iterations with the best
/// solution found so far left in `dv`.
#[allow(clippy::too_many_arguments)]
pub(crate) fn solve_filtered(
    a: &BlockMatrix,
    b: &[Vec3],
    z: &[Vec3],
    s: &[Mat3],
    dv: &mut [Vec3],
    ws: &mut CgWorkspace,
    config: &SolverConfig,
    observer: &mut dyn FnMut(CgIteration),
) -> SolverResult {
    let kind = config.preconditioner;
    if kind == Preconditioner::BlockJacobi {
        ws.build_block_jacobi(a);
    }

    lfvector::copy(dv, z);

    lfvector::copy(&mut ws.fb, b);
    filter(&mut ws.fb, s);
    let bnorm2 = lfvector::norm_sq(&ws.fb);
    let delta_target = config.epsilon * config.epsilon * bnorm2;

    // r = filter(B - A·dV)
    a.mul_vector(dv, &mut ws.q, &mut ws.scratch);
    lfvector::sub(&mut ws.r, b, &ws.q);
    filter(&mut ws.r, s);

    precondition(kind, &ws.p_inv, &ws.r, &mut ws.c);
    filter(&mut ws.c, s);

    let mut delta_new = lfvector::dot(&ws.r, &ws.c);
    observer(CgIteration {
        iteration: 0,
        residual: relative_residual(delta_new, bnorm2),
    });

    if !delta_new.is_finite() || !bnorm2.is_finite() {
        return SolverResult {
            status: SolverStatus::NumericalIssue,
            iterations: 0,
            error: f32::INFINITY,
        };
    }

    let mut iterations = 0u32;
    let mut status = SolverStatus::Success;

    while delta_new > delta_target && iterations < config.max_iterations {
        a.mul_vector(&ws.c, &mut ws.q, &mut ws.scratch);
        filter(&mut ws.q, s);

        let curvature = lfvector::dot(&ws.c, &ws.q);
        if !(curvature.is_finite() && curvature > 0.0) {
            status = SolverStatus::NumericalIssue;
            break;
        }
        let alpha = delta_new / curvature;

        lfvector::axpy(dv, &ws.c, alpha);
        lfvector::axpy(&mut ws.r, &ws.q, -alpha);

        precondition(kind, &ws.p_inv, &ws.r, &mut ws.s);
        let delta_old = delta_new;
        delta_new = lfvector::dot(&ws.r, &ws.s);

        // c = filter(s + c·(delta_new / delta_old))
        lfvector::scale_add(&mut ws.c, delta_new / delta_old, &ws.s);
        filter(&mut ws.c, s);

        iterations += 1;
        let residual = relative_residual(delta_new, bnorm2);
        tracing::trace!(iteration = iterations, residual, "cg iteration");
        observer(CgIteration {
            iteration: iterations,
            residual,
        });

        if !delta_new.is_finite() {
            status = SolverStatus::NumericalIssue;
            break;
        }
    }

    if status == SolverStatus::Success && delta_new > delta_target {
        status = SolverStatus::NoConvergence;
    }
    if !lfvector::is_finite(dv) {
        status = SolverStatus::NumericalIssue;
    }

    SolverResult {
        status,
        iterations,
        error: relative_residual(delta_new, bnorm2),
    }
}
