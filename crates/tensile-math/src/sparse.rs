//! Symmetric sparse block matrix.
//!
//! The layout is fixed: the first `vertex_count` blocks are the diagonal
//! blocks (row == col == vertex), followed by up to `spring_capacity`
//! off-diagonal blocks, one per coupled vertex pair. Only one triangle is
//! stored; the product applies every off-diagonal block twice, once directly
//! to its row and once transposed to its column.
//!
//! ```text
//! blocks: [ d0 d1 d2 ... d(n-1) | o0 o1 ... o(used-1) | unused ... ]
//!                                 (row, col) tagged
//! ```

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use tensile_types::constants::PARALLEL_VERTEX_THRESHOLD;
use tensile_types::{BlockId, TensileError, TensileResult};

use crate::block;
use crate::lfvector;

/// One 3×3 block tagged with its (row, col) vertex pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Block contents.
    pub m: Mat3,
    /// Row vertex.
    pub row: u32,
    /// Column vertex.
    pub col: u32,
}

impl Block {
    fn new(row: u32, col: u32) -> Self {
        Self {
            m: Mat3::ZERO,
            row,
            col,
        }
    }

    /// True for blocks on the diagonal.
    #[inline]
    pub fn is_diagonal(&self) -> bool {
        self.row == self.col
    }
}

/// Block matrix with one diagonal block per vertex and one
/// off-diagonal block per registered spring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockMatrix {
    /// Diagonal blocks followed by the off-diagonal slots.
    blocks: Vec<Block>,
    /// Number of vertices (diagonal blocks).
    vertex_count: usize,
    /// Maximum number of off-diagonal blocks.
    spring_capacity: usize,
    /// Off-diagonal blocks registered since the last reset.
    used: usize,
    /// Vertex count above which the product runs its two passes concurrently.
    parallel_threshold: usize,
}

impl BlockMatrix {
    /// Allocates `vertex_count + spring_capacity` zero blocks, tagging the
    /// leading `vertex_count` as the diagonal.
    pub fn new(vertex_count: usize, spring_capacity: usize) -> Self {
        let mut blocks = Vec::with_capacity(vertex_count + spring_capacity);
        for i in 0..vertex_count {
            blocks.push(Block::new(i as u32, i as u32));
        }
        blocks.resize(vertex_count + spring_capacity, Block::new(0, 0));

        Self {
            blocks,
            vertex_count,
            spring_capacity,
            used: 0,
            parallel_threshold: PARALLEL_VERTEX_THRESHOLD,
        }
    }

    /// Overrides the vertex count above which the product is split in two
    /// concurrent passes.
    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Sets the parallel threshold in place.
    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Declared off-diagonal capacity.
    #[inline]
    pub fn spring_capacity(&self) -> usize {
        self.spring_capacity
    }

    /// Off-diagonal blocks registered since the last reset.
    #[inline]
    pub fn offdiag_count(&self) -> usize {
        self.used
    }

    /// Diagonal and registered off-diagonal blocks.
    #[inline]
    pub fn active_blocks(&self) -> &[Block] {
        &self.blocks[..self.vertex_count + self.used]
    }

    /// The registered off-diagonal blocks.
    #[inline]
    pub fn offdiag_blocks(&self) -> &[Block] {
        &self.blocks[self.vertex_count..self.vertex_count + self.used]
    }

    /// The diagonal blocks.
    #[inline]
    pub fn diagonal_blocks(&self) -> &[Block] {
        &self.blocks[..self.vertex_count]
    }

    /// Diagonal block of vertex `i`.
    #[inline]
    pub fn diag(&self, i: usize) -> &Mat3 {
        &self.blocks[i].m
    }

    #[inline]
    pub fn diag_mut(&mut self, i: usize) -> &mut Mat3 {
        &mut self.blocks[i].m
    }

    /// Block by id (diagonal or off-diagonal).
    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    #[inline]
    pub fn block_mut(&mut self, id: BlockId) -> &mut Mat3 {
        &mut self.blocks[id.index()].m
    }

    /// Registers the next unused off-diagonal slot for (`row`, `col`).
    ///
    /// Returns [`TensileError::CapacityExceeded`] when every slot is in use.
    pub fn try_add_block(&mut self, row: u32, col: u32) -> TensileResult<BlockId> {
        if self.used >= self.spring_capacity {
            return Err(TensileError::CapacityExceeded {
                requested: self.used + 1,
                capacity: self.spring_capacity,
            });
        }
        let slot = self.vertex_count + self.used;
        self.blocks[slot] = Block::new(row, col);
        self.used += 1;
        Ok(BlockId(slot as u32))
    }

    /// Registers the next unused off-diagonal slot for (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if the declared spring capacity is exhausted. The solver must be
    /// sized for the largest number of couplings touched in one timestep.
    pub fn add_block(&mut self, row: u32, col: u32) -> BlockId {
        match self.try_add_block(row, col) {
            Ok(id) => id,
            Err(e) => panic!("sparse block matrix misconfigured: {e}"),
        }
    }

    /// Zeros every block and forgets all off-diagonal registrations.
    pub fn clear(&mut self) {
        for b in &mut self.blocks {
            b.m = Mat3::ZERO;
        }
        self.used = 0;
    }

    /// Zeros the off-diagonal blocks and forgets their registrations,
    /// keeping the diagonal (e.g. masses) intact.
    pub fn clear_offdiag(&mut self) {
        let n = self.vertex_count;
        for b in &mut self.blocks[n..n + self.used] {
            b.m = Mat3::ZERO;
        }
        self.used = 0;
    }

    /// Overwrites this matrix with `base - b * s - c * t`, block by block.
    ///
    /// All three inputs must share the same registered structure; the
    /// structure is copied from `base`.
    pub fn assign_sub_scaled(
        &mut self,
        base: &BlockMatrix,
        b: &BlockMatrix,
        s: f32,
        c: &BlockMatrix,
        t: f32,
    ) {
        debug_assert_eq!(self.vertex_count, base.vertex_count);
        debug_assert_eq!(base.used, b.used);
        debug_assert_eq!(base.used, c.used);
        debug_assert!(base.used <= self.spring_capacity);

        let active = base.vertex_count + base.used;
        for k in 0..active {
            let src = &base.blocks[k];
            debug_assert!(b.blocks[k].row == src.row && b.blocks[k].col == src.col);
            debug_assert!(c.blocks[k].row == src.row && c.blocks[k].col == src.col);
            self.blocks[k] = Block {
                m: block::sub_scaled2(&src.m, &b.blocks[k].m, s, &c.blocks[k].m, t),
                row: src.row,
                col: src.col,
            };
        }
        self.used = base.used;
    }

    /// Sparse matrix-vector product `out = self * v`, treating the stored
    /// triangle as a symmetric matrix.
    ///
    /// `scratch` is a second accumulator of the same length. Above the
    /// parallel threshold the transposed pass (into `out`) and the direct pass
    /// (into `scratch`) run concurrently; the two are summed afterwards.
    pub fn mul_vector(&self, v: &[Vec3], out: &mut [Vec3], scratch: &mut [Vec3]) {
        debug_assert_eq!(v.len(), self.vertex_count);
        debug_assert_eq!(out.len(), self.vertex_count);
        debug_assert_eq!(scratch.len(), self.vertex_count);

        let active = self.active_blocks();
        let offdiag = self.offdiag_blocks();

        if self.vertex_count > self.parallel_threshold {
            rayon::join(
                || accumulate_transposed(offdiag, v, out),
                || accumulate_direct(active, v, scratch),
            );
        } else {
            accumulate_transposed(offdiag, v, out);
            accumulate_direct(active, v, scratch);
        }

        lfvector::add_assign(out, scratch);
    }

    /// Allocating convenience wrapper around [`mul_vector`](Self::mul_vector).
    pub fn mul(&self, v: &[Vec3]) -> Vec<Vec3> {
        let mut out = lfvector::zeroed(self.vertex_count);
        let mut scratch = lfvector::zeroed(self.vertex_count);
        self.mul_vector(v, &mut out, &mut scratch);
        out
    }

    /// Expands the symmetric block storage to scalar `(row, col, value)`
    /// triplets of the full `3n × 3n` matrix. Zero entries are skipped.
    pub fn to_triplets(&self) -> Vec<(usize, usize, f32)> {
        let mut triplets = Vec::with_capacity(9 * (self.vertex_count + 2 * self.used));
        for b in self.active_blocks() {
            let (r, c) = (3 * b.row as usize, 3 * b.col as usize);
            for i in 0..3 {
                for j in 0..3 {
                    let val = block::entry(&b.m, i, j);
                    if val == 0.0 {
                        continue;
                    }
                    triplets.push((r + i, c + j, val));
                    if !b.is_diagonal() {
                        triplets.push((c + j, r + i, val));
                    }
                }
            }
        }
        triplets
    }

    /// True if every active block is finite.
    pub fn is_finite(&self) -> bool {
        self.active_blocks().iter().all(|b| block::is_finite(&b.m))
    }
}

/// `acc[col] += mᵀ v[row]` for every off-diagonal block (the lower triangle).
fn accumulate_transposed(offdiag: &[Block], v: &[Vec3], acc: &mut [Vec3]) {
    lfvector::zero(acc);
    for b in offdiag {
        acc[b.col as usize] += block::mul_transposed(&b.m, v[b.row as usize]);
    }
}

/// `acc[row] += m v[col]` for every stored block, diagonal included.
fn accumulate_direct(blocks: &[Block], v: &[Vec3], acc: &mut [Vec3]) {
    lfvector::zero(acc);
    for b in blocks {
        acc[b.row as usize] += b.m * v[b.col as usize];
    }
}
