//! Three-point hair bending spring.
//!
//! The edge (`j`, `k`) is pulled towards a goal edge vector expressed in the
//! frame of `j`, the middle vertex. The analytic jacobian of this model is
//! error-prone, so both jacobians are estimated with central differences.

use glam::{Mat3, Vec3};
use tensile_types::constants::HAIR_FD_DELTA;

use crate::assembly::Assembly;

/// Central-difference estimate of `∂f/∂u` at `u = 0`.
///
/// Column `a` is `(f(+δ/2·e_a) - f(-δ/2·e_a)) / δ`.
pub fn central_difference(delta: f32, mut f: impl FnMut(Vec3) -> Vec3) -> Mat3 {
    let mut column = |axis: Vec3| {
        let h = axis * (0.5 * delta);
        (f(h) - f(-h)) / delta
    };
    let x = column(Vec3::X);
    let y = column(Vec3::Y);
    let z = column(Vec3::Z);
    Mat3::from_cols(x, y, z)
}

/// Force on `k` for a given edge `k - j` and relative velocity.
fn hair_bend_force(goal: Vec3, edge: Vec3, vel: Vec3, stiffness: f32, damping: f32) -> Vec3 {
    let dir = edge.normalize_or_zero();
    let vel_ortho = vel - dir * vel.dot(dir);
    (goal - edge) * stiffness - vel_ortho * damping
}

impl Assembly<'_> {
    /// Bending spring on the hair segment `i → j → k`. `target` is the
    /// world-space goal for the edge `k - j`.
    ///
    /// `k` receives the restoring force and `j` the counterforce; `i` only
    /// enters through the jacobian couplings.
    pub fn spring_bending_hair(
        &mut self,
        i: usize,
        j: usize,
        k: usize,
        target: Vec3,
        stiffness: f32,
        damping: f32,
    ) -> bool {
        let goal = self.data.to_local(j, target);
        let edge = self.data.x[k] - self.data.x[j];
        let vel = self.data.v[k] - self.data.v[j];

        // How a perturbation of vertex q moves the edge `k - j`.
        let edge_offset = |q: usize, d: Vec3| {
            if q == k {
                d
            } else if q == j {
                -d
            } else {
                Vec3::ZERO
            }
        };
        let dfk_dx = |q: usize| {
            central_difference(HAIR_FD_DELTA, |d| {
                hair_bend_force(goal, edge + edge_offset(q, d), vel, stiffness, damping)
            })
        };
        let dfk_dv = |q: usize| {
            central_difference(HAIR_FD_DELTA, |d| {
                hair_bend_force(goal, edge, vel + edge_offset(q, d), stiffness, damping)
            })
        };

        let fk = hair_bend_force(goal, edge, vel, stiffness, damping);
        let (dfk_dxi, dfk_dxj, dfk_dxk) = (dfk_dx(i), dfk_dx(j), dfk_dx(k));
        let (dfk_dvi, dfk_dvj, dfk_dvk) = (dfk_dv(i), dfk_dv(j), dfk_dv(k));

        self.add_force(j, -fk);
        self.add_force(k, fk);

        self.add_diagonal(j, &-dfk_dxj, &-dfk_dvj);
        self.add_diagonal(k, &dfk_dxk, &dfk_dvk);

        self.add_coupling(j, i, &-dfk_dxi, &-dfk_dvi);
        self.add_coupling(k, j, &dfk_dxj, &dfk_dvj);
        self.add_coupling(k, i, &dfk_dxi, &dfk_dvi);
        true
    }
}
