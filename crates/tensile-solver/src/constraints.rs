//! Per-vertex velocity constraints.
//!
//! Each vertex carries a projection `S` onto its free subspace and a seed
//! `z` for the velocity increment in the locked subspace. The solver starts
//! from `z` and filters every update through `S`, so the locked components
//! of the increment stay at `z` and `Vnew = V + dV` lands on the target.

use glam::{Mat3, Vec3};
use tensile_math::{block, lfvector};

use crate::state::ImplicitData;

/// Applies the per-vertex projections in place: `v[i] = S[i] · v[i]`.
pub fn filter(v: &mut [Vec3], s: &[Mat3]) {
    debug_assert_eq!(v.len(), s.len());
    for (v, s) in v.iter_mut().zip(s) {
        *v = *s * *v;
    }
}

impl ImplicitData {
    /// Frees every vertex: `S = I`, `z = 0`.
    pub fn clear_constraints(&mut self) {
        self.s.fill(Mat3::IDENTITY);
        lfvector::zero(&mut self.z);
    }

    /// Locks all three axes of vertex `i` to a world-space target velocity.
    ///
    /// Replaces any seed left by earlier constraints on the vertex.
    pub fn add_constraint_ndof0(&mut self, i: usize, target_velocity: Vec3) {
        let target = self.to_local(i, target_velocity);
        self.s[i] = Mat3::ZERO;
        self.z[i] = target - self.v[i];
    }

    /// Restricts vertex `i` to the line orthogonal to the world-space
    /// directions `c1` and `c2`. Along those directions the velocity is
    /// driven to `target_velocity`.
    pub fn add_constraint_ndof1(&mut self, i: usize, c1: Vec3, c2: Vec3, target_velocity: Vec3) {
        let c1 = self.to_local(i, c1.normalize_or_zero());
        let c2 = self.to_local(i, c2.normalize_or_zero());
        let locked = block::outer(c1, c1) + block::outer(c2, c2);
        self.lock(i, &locked, target_velocity);
    }

    /// Restricts vertex `i` to the plane orthogonal to the world-space
    /// direction `c1`. Along `c1` the velocity is driven to `target_velocity`.
    pub fn add_constraint_ndof2(&mut self, i: usize, c1: Vec3, target_velocity: Vec3) {
        let c1 = self.to_local(i, c1.normalize_or_zero());
        let locked = block::outer(c1, c1);
        self.lock(i, &locked, target_velocity);
    }

    /// Composes the projection and overwrites the seed in the newly locked
    /// subspace, keeping the rest of it.
    fn lock(&mut self, i: usize, locked: &Mat3, target_velocity: Vec3) {
        let target = self.to_local(i, target_velocity);
        let free = Mat3::IDENTITY - *locked;
        self.s[i] *= free;
        self.z[i] = free * self.z[i] + *locked * (target - self.v[i]);
    }

    /// Constraint projection of vertex `i` (local frame).
    pub fn constraint_filter(&self, i: usize) -> Mat3 {
        self.s[i]
    }

    /// Increment seed of vertex `i` (local frame).
    pub fn constraint_seed(&self, i: usize) -> Vec3 {
        self.z[i]
    }
}
