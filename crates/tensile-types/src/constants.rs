//! Physical constants and solver defaults.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f32 = 9.81;

/// Default simulation timestep (seconds).
pub const DEFAULT_DT: f32 = 1.0 / 60.0;

/// Default cap on conjugate-gradient iterations per solve.
pub const DEFAULT_CG_ITERATIONS: u32 = 100;

/// Default relative residual tolerance for the conjugate-gradient solver.
pub const DEFAULT_CG_EPSILON: f32 = 0.01;

/// Vertex count above which the sparse matrix-vector product
/// runs its transposed and direct passes concurrently.
pub const PARALLEL_VERTEX_THRESHOLD: usize = 512;

/// Lengths at or below this are treated as zero (degenerate springs).
pub const ALMOST_ZERO: f32 = f32::EPSILON;

/// Epsilon for floating-point comparisons.
pub const EPSILON: f32 = 1.0e-7;

/// Central-difference span used to estimate hair bending jacobians.
pub const HAIR_FD_DELTA: f32 = 1.0e-5;

/// Scale applied to face wind pressure.
pub const FACE_WIND_SCALE: f32 = 0.02;

/// Air density proxy used by edge and vertex wind.
pub const AIR_DENSITY: f32 = 0.01;
