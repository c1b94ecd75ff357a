//! Sparse Cholesky reference solver backed by `faer`.
//!
//! Factors an assembled [`BlockMatrix`] (expanded to its full symmetric
//! scalar form) with faer's supernodal LLᵀ and solves for long vectors. The
//! factorization runs in f64 internally but accepts and returns `Vec3` (f32)
//! at the interface boundary.
//!
//! This is not part of the per-timestep pipeline; it exists to check the
//! iterative solver's answers on small systems.
//!
//! ## Workflow
//! 1. `factorize(matrix)`: expand blocks to triplets, symbolic + numeric LLᵀ
//! 2. `solve(rhs, solution)`: forward/backward substitution (cached factorization)

use faer::Side;
use faer::linalg::solvers::Solve;
use faer::sparse::SparseColMat;
use faer::sparse::Triplet;
use faer::sparse::linalg::solvers::{Llt, SymbolicLlt};
use glam::Vec3;
use tensile_types::{TensileError, TensileResult};

use crate::sparse::BlockMatrix;

/// A direct solver for symmetric positive-definite block systems.
pub trait BlockSolver {
    /// Factorize the matrix. Call once per assembled system.
    fn factorize(&mut self, matrix: &BlockMatrix) -> TensileResult<()>;

    /// Solve `A x = b` using the cached factorization.
    fn solve(&self, rhs: &[Vec3], solution: &mut [Vec3]) -> TensileResult<()>;

    /// Returns true if the solver holds a valid factorization.
    fn is_factorized(&self) -> bool;
}

/// Sparse Cholesky (LLᵀ) solver using `faer`.
pub struct DirectSolver {
    /// Cached LLᵀ factorization.
    factorization: Option<Llt<usize, f64>>,
    /// Number of vertices (the scalar dimension is three times this).
    vertex_count: usize,
}

impl DirectSolver {
    /// Creates a new solver (unfactorized).
    pub fn new() -> Self {
        Self {
            factorization: None,
            vertex_count: 0,
        }
    }

    /// Expand the block matrix into faer's CSC matrix (f64).
    fn to_csc_f64(matrix: &BlockMatrix) -> TensileResult<SparseColMat<usize, f64>> {
        let dim = 3 * matrix.vertex_count();
        let triplets: Vec<Triplet<usize, usize, f64>> = matrix
            .to_triplets()
            .into_iter()
            .map(|(row, col, val)| Triplet {
                row,
                col,
                val: val as f64,
            })
            .collect();

        SparseColMat::try_new_from_triplets(dim, dim, &triplets).map_err(|e| {
            TensileError::InvalidInput(format!("failed to construct faer CSC matrix: {e:?}"))
        })
    }
}

impl Default for DirectSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockSolver for DirectSolver {
    fn factorize(&mut self, matrix: &BlockMatrix) -> TensileResult<()> {
        if matrix.vertex_count() == 0 {
            return Err(TensileError::InvalidInput(
                "cannot factorize an empty matrix".into(),
            ));
        }

        self.vertex_count = matrix.vertex_count();
        let csc = Self::to_csc_f64(matrix)?;

        let symbolic = SymbolicLlt::try_new(csc.symbolic().as_ref(), Side::Upper)
            .map_err(|e| TensileError::InvalidInput(format!("symbolic analysis failed: {e:?}")))?;

        let llt = Llt::try_new_with_symbolic(symbolic, csc.as_ref(), Side::Upper).map_err(|e| {
            TensileError::InvalidInput(format!("Cholesky factorization failed: {e:?}"))
        })?;

        self.factorization = Some(llt);
        Ok(())
    }

    fn solve(&self, rhs: &[Vec3], solution: &mut [Vec3]) -> TensileResult<()> {
        let llt = self.factorization.as_ref().ok_or_else(|| {
            TensileError::InvalidInput("solver not factorized, call factorize() first".into())
        })?;

        if rhs.len() != self.vertex_count || solution.len() != self.vertex_count {
            return Err(TensileError::InvalidInput(format!(
                "rhs/solution length ({}/{}) != vertex count ({})",
                rhs.len(),
                solution.len(),
                self.vertex_count
            )));
        }

        let dim = 3 * self.vertex_count;
        let rhs_f64: faer::Mat<f64> =
            faer::Mat::from_fn(dim, 1, |i, _| rhs[i / 3][i % 3] as f64);

        let sol = llt.solve(&rhs_f64);

        for (i, out) in solution.iter_mut().enumerate() {
            *out = Vec3::new(
                sol[(3 * i, 0)] as f32,
                sol[(3 * i + 1, 0)] as f32,
                sol[(3 * i + 2, 0)] as f32,
            );
        }

        Ok(())
    }

    fn is_factorized(&self) -> bool {
        self.factorization.is_some()
    }
}
