//! Simulation state container.
//!
//! [`ImplicitData`] owns every per-vertex array, the mass and jacobian block
//! matrices, the system matrix, the constraint data, and the conjugate
//! gradient workspace. Everything is sized once at construction and reused
//! in place every timestep.
//!
//! Positions, velocities and forces are stored in each vertex's local frame.
//! The public accessors take and return world-space values and convert with
//! the vertex rotation on the way in and out. With the default identity
//! frames the two spaces coincide.

use std::collections::HashMap;

use glam::{Mat3, Vec3};
use tensile_math::{BlockMatrix, block, lfvector};
use tensile_types::{BlockId, TensileError, TensileResult};

use crate::assembly::Assembly;
use crate::cg::CgWorkspace;
use crate::config::SolverConfig;

/// Location of a coupling block relative to the requested orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Coupling {
    pub id: BlockId,
    /// True when the block is stored as (col, row); contributions must be
    /// transposed before they are added.
    pub transposed: bool,
}

/// Solver state for one deformable object.
#[derive(Debug, Clone)]
pub struct ImplicitData {
    pub(crate) config: SolverConfig,

    /// Per-vertex local frame rotation (local → world).
    pub(crate) tfm: Vec<Mat3>,
    pub(crate) x: Vec<Vec3>,
    pub(crate) v: Vec<Vec3>,
    pub(crate) x_new: Vec<Vec3>,
    pub(crate) v_new: Vec<Vec3>,
    pub(crate) f: Vec<Vec3>,

    pub(crate) mass: BlockMatrix,
    pub(crate) dfdx: BlockMatrix,
    pub(crate) dfdv: BlockMatrix,
    /// System matrix `M - dt·dF/dV - dt²·dF/dX`.
    pub(crate) a: BlockMatrix,
    pub(crate) b: Vec<Vec3>,
    pub(crate) dv: Vec<Vec3>,

    /// Constraint projection per vertex (identity when free).
    pub(crate) s: Vec<Mat3>,
    /// Velocity increment seed in the locked subspace.
    pub(crate) z: Vec<Vec3>,

    /// Unordered vertex pair → off-diagonal block registered this step.
    pub(crate) couplings: HashMap<(u32, u32), BlockId>,
    pub(crate) workspace: CgWorkspace,
}

impl ImplicitData {
    /// Allocates state for `vertex_count` vertices and at most
    /// `spring_capacity` coupled vertex pairs per timestep, with the default
    /// configuration.
    pub fn new(vertex_count: usize, spring_capacity: usize) -> TensileResult<Self> {
        Self::with_config(vertex_count, spring_capacity, SolverConfig::default())
    }

    /// Allocates state with an explicit solver configuration.
    pub fn with_config(
        vertex_count: usize,
        spring_capacity: usize,
        config: SolverConfig,
    ) -> TensileResult<Self> {
        config.validate()?;
        if vertex_count == 0 {
            return Err(TensileError::InvalidInput(
                "solver state needs at least one vertex".into(),
            ));
        }
        if vertex_count + spring_capacity > u32::MAX as usize {
            return Err(TensileError::InvalidInput(format!(
                "{vertex_count} vertices with {spring_capacity} springs exceed the block index range"
            )));
        }

        let matrix = BlockMatrix::new(vertex_count, spring_capacity)
            .with_parallel_threshold(config.parallel_threshold);

        Ok(Self {
            tfm: vec![Mat3::IDENTITY; vertex_count],
            x: lfvector::zeroed(vertex_count),
            v: lfvector::zeroed(vertex_count),
            x_new: lfvector::zeroed(vertex_count),
            v_new: lfvector::zeroed(vertex_count),
            f: lfvector::zeroed(vertex_count),
            mass: matrix.clone(),
            dfdx: matrix.clone(),
            dfdv: matrix.clone(),
            a: matrix,
            b: lfvector::zeroed(vertex_count),
            dv: lfvector::zeroed(vertex_count),
            s: vec![Mat3::IDENTITY; vertex_count],
            z: lfvector::zeroed(vertex_count),
            couplings: HashMap::with_capacity(spring_capacity),
            workspace: CgWorkspace::new(vertex_count),
            config,
        })
    }

    // ─── Sizing and configuration ────────────────────────────

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn spring_capacity(&self) -> usize {
        self.dfdx.spring_capacity()
    }

    /// Off-diagonal blocks registered since the last [`clear_forces`](Self::clear_forces).
    #[inline]
    pub fn coupling_count(&self) -> usize {
        self.dfdx.offdiag_count()
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replaces the solver configuration after validating it.
    pub fn set_config(&mut self, config: SolverConfig) -> TensileResult<()> {
        config.validate()?;
        for m in [&mut self.mass, &mut self.dfdx, &mut self.dfdv, &mut self.a] {
            m.set_parallel_threshold(config.parallel_threshold);
        }
        self.config = config;
        Ok(())
    }

    // ─── Per-vertex setters and getters ──────────────────────

    /// Sets a lumped point mass (`mass · I` on the diagonal of M).
    pub fn set_vertex_mass(&mut self, i: usize, mass: f32) {
        *self.mass.diag_mut(i) = block::scaled_identity(mass);
    }

    pub fn vertex_mass(&self, i: usize) -> f32 {
        self.mass.diag(i).x_axis.x
    }

    /// Sets the local frame rotation of vertex `i` (local → world).
    ///
    /// Stored positions and velocities are not re-expressed, so set the frame
    /// before the motion state.
    pub fn set_rest_transform(&mut self, i: usize, tfm: Mat3) {
        self.tfm[i] = tfm;
    }

    pub fn rest_transform(&self, i: usize) -> Mat3 {
        self.tfm[i]
    }

    /// Sets world-space position and velocity of vertex `i`.
    pub fn set_motion_state(&mut self, i: usize, x: Vec3, v: Vec3) {
        self.x[i] = self.to_local(i, x);
        self.v[i] = self.to_local(i, v);
    }

    pub fn set_position(&mut self, i: usize, x: Vec3) {
        self.x[i] = self.to_local(i, x);
    }

    pub fn set_velocity(&mut self, i: usize, v: Vec3) {
        self.v[i] = self.to_local(i, v);
    }

    /// World-space position and velocity of vertex `i`.
    pub fn motion_state(&self, i: usize) -> (Vec3, Vec3) {
        (self.position(i), self.velocity(i))
    }

    pub fn position(&self, i: usize) -> Vec3 {
        self.to_world(i, self.x[i])
    }

    pub fn velocity(&self, i: usize) -> Vec3 {
        self.to_world(i, self.v[i])
    }

    pub fn new_position(&self, i: usize) -> Vec3 {
        self.to_world(i, self.x_new[i])
    }

    pub fn set_new_position(&mut self, i: usize, x: Vec3) {
        self.x_new[i] = self.to_local(i, x);
    }

    pub fn new_velocity(&self, i: usize) -> Vec3 {
        self.to_world(i, self.v_new[i])
    }

    pub fn set_new_velocity(&mut self, i: usize, v: Vec3) {
        self.v_new[i] = self.to_local(i, v);
    }

    /// Accumulated force on vertex `i`, world frame.
    pub fn force(&self, i: usize) -> Vec3 {
        self.to_world(i, self.f[i])
    }

    /// Local-frame velocity after the last solve.
    pub fn new_velocity_local(&self, i: usize) -> Vec3 {
        self.v_new[i]
    }

    // ─── Assembled matrices ──────────────────────────────────

    pub fn mass_matrix(&self) -> &BlockMatrix {
        &self.mass
    }

    /// Jacobian of the force with respect to position.
    pub fn dfdx(&self) -> &BlockMatrix {
        &self.dfdx
    }

    /// Jacobian of the force with respect to velocity.
    pub fn dfdv(&self) -> &BlockMatrix {
        &self.dfdv
    }

    /// System matrix assembled by the last [`solve_velocities`](Self::solve_velocities).
    pub fn system_matrix(&self) -> &BlockMatrix {
        &self.a
    }

    /// Right-hand side assembled by the last solve.
    pub fn rhs(&self) -> &[Vec3] {
        &self.b
    }

    /// Velocity increment from the last solve, local frames.
    pub fn velocity_increment(&self) -> &[Vec3] {
        &self.dv
    }

    // ─── Force assembly ──────────────────────────────────────

    /// Zeros forces and jacobians, forgets every coupling block, and opens
    /// the assembly context for this timestep's force kernels.
    pub fn clear_forces(&mut self) -> Assembly<'_> {
        lfvector::zero(&mut self.f);
        self.dfdx.clear();
        self.dfdv.clear();
        self.mass.clear_offdiag();
        self.couplings.clear();
        Assembly::new(self)
    }

    /// Reopens the assembly context without clearing, to add more forces to
    /// the current timestep.
    pub fn assembly(&mut self) -> Assembly<'_> {
        Assembly::new(self)
    }

    /// Finds or registers the block holding `∂F_row/∂X_col`.
    ///
    /// The block is registered on M and both jacobians so the three share
    /// one structure.
    ///
    /// # Panics
    ///
    /// Panics when more distinct pairs are coupled than the declared spring
    /// capacity.
    pub(crate) fn couple(&mut self, row: usize, col: usize) -> Coupling {
        if row == col {
            return Coupling {
                id: BlockId(row as u32),
                transposed: false,
            };
        }

        let key = (row.min(col) as u32, row.max(col) as u32);
        if let Some(&id) = self.couplings.get(&key) {
            return Coupling {
                id,
                transposed: self.dfdx.block(id).row as usize != row,
            };
        }

        let (r, c) = (row as u32, col as u32);
        let id = self.dfdx.add_block(r, c);
        let dfdv_id = self.dfdv.add_block(r, c);
        let mass_id = self.mass.add_block(r, c);
        debug_assert!(id == dfdv_id && id == mass_id);

        self.couplings.insert(key, id);
        Coupling {
            id,
            transposed: false,
        }
    }

    // ─── Frame conversion ────────────────────────────────────

    /// World → local for a vector attached to vertex `i`.
    #[inline]
    pub(crate) fn to_local(&self, i: usize, v: Vec3) -> Vec3 {
        block::mul_transposed(&self.tfm[i], v)
    }

    /// Local → world for a vector attached to vertex `i`.
    #[inline]
    pub(crate) fn to_world(&self, i: usize, v: Vec3) -> Vec3 {
        self.tfm[i] * v
    }

    /// World → local for a jacobian block of vertex `i`: `Rᵀ J R`.
    #[inline]
    pub(crate) fn to_local_block(&self, i: usize, m: &Mat3) -> Mat3 {
        let r = self.tfm[i];
        r.transpose() * *m * r
    }
}
