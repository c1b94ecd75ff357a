//! Externally supplied forces and single-vertex kernels: gravity, viscous
//! drag and the fictitious forces of a rotating reference frame.

use glam::{Mat3, Vec3};
use tensile_math::block;

use crate::assembly::Assembly;

impl Assembly<'_> {
    /// Generic external force with jacobians, all in world space.
    ///
    /// This is the entry point for collision response and effectors.
    pub fn force_extern(&mut self, i: usize, f: Vec3, dfdx: &Mat3, dfdv: &Mat3) {
        let f = self.data.to_local(i, f);
        let dfdx = self.data.to_local_block(i, dfdx);
        let dfdv = self.data.to_local_block(i, dfdv);
        self.add_force(i, f);
        self.add_diagonal(i, &dfdx, &dfdv);
    }

    /// Couples two vertices with caller-supplied world-space blocks
    /// `∂F_i/∂X_j` and `∂F_i/∂V_j`. The transposed contribution to row `j`
    /// is implied by the symmetric storage.
    pub fn couple_extern(&mut self, i: usize, j: usize, dfdx: &Mat3, dfdv: &Mat3) {
        let (ri, rj) = (self.data.tfm[i], self.data.tfm[j]);
        let dfdx = ri.transpose() * *dfdx * rj;
        let dfdv = ri.transpose() * *dfdv * rj;
        self.add_coupling(i, j, &dfdx, &dfdv);
    }

    /// `F += M·g` for a world-space acceleration `g`. Constant force, no
    /// jacobian.
    pub fn force_gravity(&mut self, i: usize, g: Vec3) {
        let g = self.data.to_local(i, g);
        let f = *self.data.mass.diag(i) * g;
        self.add_force(i, f);
    }

    /// Viscous drag on every vertex: `F -= c·V`, `dF/dV -= c·I`.
    pub fn force_drag(&mut self, drag: f32) {
        let dfdv = block::scaled_identity(-drag);
        for i in 0..self.vertex_count() {
            let f = self.data.v[i] * -drag;
            self.add_force(i, f);
            self.add_diagonal(i, &Mat3::ZERO, &dfdv);
        }
    }

    /// Fictitious forces on a vertex whose local frame moves with linear
    /// `acceleration`, angular velocity `omega` and angular acceleration
    /// `domega_dt` (all world space).
    ///
    /// `F = -m (a + dω×x + 2 ω×v + ω×(ω×x))` with
    /// `dF/dX = -m ([dω]× + [ω]×[ω]×)` and `dF/dV = -2m [ω]×`.
    pub fn force_reference_frame(
        &mut self,
        i: usize,
        acceleration: Vec3,
        omega: Vec3,
        domega_dt: Vec3,
        mass: f32,
    ) {
        let acc = self.data.to_local(i, acceleration);
        let w = self.data.to_local(i, omega);
        let dw = self.data.to_local(i, domega_dt);
        let (x, v) = (self.data.x[i], self.data.v[i]);

        let euler = dw.cross(x);
        let coriolis = 2.0 * w.cross(v);
        let centrifugal = w.cross(w.cross(x));
        let f = -mass * (acc + euler + coriolis + centrifugal);

        let w_cross = block::cross_matrix(w);
        let dfdx = (block::cross_matrix(dw) + w_cross * w_cross) * -mass;
        let dfdv = w_cross * (-2.0 * mass);

        self.add_force(i, f);
        self.add_diagonal(i, &dfdx, &dfdv);
    }
}
