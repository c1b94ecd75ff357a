//! Strongly-typed identifiers for solver entities.
//!
//! Vertices are addressed by plain `usize` indices throughout the solver;
//! blocks get a newtype so a block slot is never mistaken for a vertex.

use serde::{Deserialize, Serialize};

/// Index of a block inside a sparse block matrix.
///
/// The first `vertex_count` blocks are diagonal; the rest are off-diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId(pub u32);

impl BlockId {
    /// Returns the raw index as `usize` for array indexing.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// True if this id addresses one of the leading diagonal blocks.
    #[inline]
    pub fn is_diagonal(self, vertex_count: usize) -> bool {
        self.index() < vertex_count
    }
}

impl From<u32> for BlockId {
    fn from(val: u32) -> Self {
        Self(val)
    }
}
