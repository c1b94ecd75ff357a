//! Fixed-size 3-vector and 3×3 block arithmetic.
//!
//! Thin helpers on top of `glam` for the handful of operations the force
//! kernels and the solver need that `glam` does not name directly.
//! Matrices are column-major; `m.col(j)[i]` is the entry at row `i`, column `j`.

use glam::{Mat3, Vec3};

/// Outer product `a ⊗ b` (the matrix `a bᵀ`).
#[inline]
pub fn outer(a: Vec3, b: Vec3) -> Mat3 {
    Mat3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Skew-symmetric cross-product matrix: `cross_matrix(v) * w == v.cross(w)`.
#[inline]
pub fn cross_matrix(v: Vec3) -> Mat3 {
    Mat3::from_cols(
        Vec3::new(0.0, v.z, -v.y),
        Vec3::new(-v.z, 0.0, v.x),
        Vec3::new(v.y, -v.x, 0.0),
    )
}

/// Transpose-applied product `mᵀ v` (equivalently `vᵀ m` as a row vector).
#[inline]
pub fn mul_transposed(m: &Mat3, v: Vec3) -> Vec3 {
    Vec3::new(m.x_axis.dot(v), m.y_axis.dot(v), m.z_axis.dot(v))
}

/// Fused `a - (b * s + c * t)`.
#[inline]
pub fn sub_scaled2(a: &Mat3, b: &Mat3, s: f32, c: &Mat3, t: f32) -> Mat3 {
    *a - (*b * s + *c * t)
}

/// Scaled identity `s * I`, e.g. a mass block.
#[inline]
pub fn scaled_identity(s: f32) -> Mat3 {
    Mat3::from_diagonal(Vec3::splat(s))
}

/// Projector onto the plane orthogonal to the unit vector `dir`: `I - dir ⊗ dir`.
#[inline]
pub fn orthogonal_projector(dir: Vec3) -> Mat3 {
    Mat3::IDENTITY - outer(dir, dir)
}

/// Entry at (`row`, `col`).
#[inline]
pub fn entry(m: &Mat3, row: usize, col: usize) -> f32 {
    m.col(col)[row]
}

/// True if every entry is finite.
#[inline]
pub fn is_finite(m: &Mat3) -> bool {
    m.x_axis.is_finite() && m.y_axis.is_finite() && m.z_axis.is_finite()
}
