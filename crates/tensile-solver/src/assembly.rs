//! Per-timestep force assembly context.
//!
//! [`Assembly`] borrows the solver state mutably for the span of one
//! timestep's force accumulation. Every force kernel is a method on it
//! (see `external`, `wind`, `spring`, `angular` and `hair`), so kernels can
//! only run between [`ImplicitData::clear_forces`] and the solve.
//!
//! Kernels work in local-frame coordinates. Vertices coupled by a spring are
//! expected to share a frame (e.g. all vertices of one hair strand).

use glam::{Mat3, Vec3};

use crate::state::ImplicitData;

/// Mutable force/jacobian accumulation scope for one timestep.
pub struct Assembly<'a> {
    pub(crate) data: &'a mut ImplicitData,
}

impl<'a> Assembly<'a> {
    pub(crate) fn new(data: &'a mut ImplicitData) -> Self {
        Self { data }
    }

    /// Read access to the state being assembled.
    pub fn data(&self) -> &ImplicitData {
        &*self.data
    }

    pub fn vertex_count(&self) -> usize {
        self.data.vertex_count()
    }

    /// Adds a local-frame force to vertex `i`.
    #[inline]
    pub(crate) fn add_force(&mut self, i: usize, f: Vec3) {
        self.data.f[i] += f;
    }

    /// Adds local-frame jacobian contributions to the diagonal block of `i`.
    #[inline]
    pub(crate) fn add_diagonal(&mut self, i: usize, dfdx: &Mat3, dfdv: &Mat3) {
        *self.data.dfdx.diag_mut(i) += *dfdx;
        *self.data.dfdv.diag_mut(i) += *dfdv;
    }

    /// Adds `∂F_row/∂X_col` and `∂F_row/∂V_col` to the coupling block of the
    /// pair, registering it on first use.
    pub(crate) fn add_coupling(&mut self, row: usize, col: usize, dfdx: &Mat3, dfdv: &Mat3) {
        let coupling = self.data.couple(row, col);
        let (dfdx, dfdv) = if coupling.transposed {
            (dfdx.transpose(), dfdv.transpose())
        } else {
            (*dfdx, *dfdv)
        };
        *self.data.dfdx.block_mut(coupling.id) += dfdx;
        *self.data.dfdv.block_mut(coupling.id) += dfdv;
    }

    /// Scatters a two-point spring: `f` acts on `i` and `-f` on `j`; the
    /// jacobian blocks are `∂f/∂x_i` on both diagonals and their negation on
    /// the (i, j) coupling.
    pub(crate) fn apply_spring(&mut self, i: usize, j: usize, f: Vec3, dfdx: &Mat3, dfdv: &Mat3) {
        self.add_force(i, f);
        self.add_force(j, -f);

        self.add_diagonal(i, dfdx, dfdv);
        self.add_diagonal(j, dfdx, dfdv);

        self.add_coupling(i, j, &-*dfdx, &-*dfdv);
    }
}
