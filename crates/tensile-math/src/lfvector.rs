//! Long-vector operations over per-vertex `Vec3` arrays.
//!
//! Every operation assumes its arguments are sized to the same vertex
//! count. That is a caller obligation: sizes are only checked in debug builds.

use glam::Vec3;

/// Allocates a zeroed long vector for `n` vertices.
pub fn zeroed(n: usize) -> Vec<Vec3> {
    vec![Vec3::ZERO; n]
}

/// `to = 0`
#[inline]
pub fn zero(to: &mut [Vec3]) {
    to.fill(Vec3::ZERO);
}

/// `to = from`
#[inline]
pub fn copy(to: &mut [Vec3], from: &[Vec3]) {
    to.copy_from_slice(from);
}

/// `to = a + b`
pub fn add(to: &mut [Vec3], a: &[Vec3], b: &[Vec3]) {
    debug_assert!(to.len() == a.len() && a.len() == b.len());
    for ((t, &a), &b) in to.iter_mut().zip(a).zip(b) {
        *t = a + b;
    }
}

/// `to += b`
pub fn add_assign(to: &mut [Vec3], b: &[Vec3]) {
    debug_assert_eq!(to.len(), b.len());
    for (t, &b) in to.iter_mut().zip(b) {
        *t += b;
    }
}

/// `to = a - b`
pub fn sub(to: &mut [Vec3], a: &[Vec3], b: &[Vec3]) {
    debug_assert!(to.len() == a.len() && a.len() == b.len());
    for ((t, &a), &b) in to.iter_mut().zip(a).zip(b) {
        *t = a - b;
    }
}

/// `to = a + b * s`
pub fn add_scaled(to: &mut [Vec3], a: &[Vec3], b: &[Vec3], s: f32) {
    debug_assert!(to.len() == a.len() && a.len() == b.len());
    for ((t, &a), &b) in to.iter_mut().zip(a).zip(b) {
        *t = a + b * s;
    }
}

/// `to += b * s`
pub fn axpy(to: &mut [Vec3], b: &[Vec3], s: f32) {
    debug_assert_eq!(to.len(), b.len());
    for (t, &b) in to.iter_mut().zip(b) {
        *t += b * s;
    }
}

/// `to = to * s + b`
pub fn scale_add(to: &mut [Vec3], s: f32, b: &[Vec3]) {
    debug_assert_eq!(to.len(), b.len());
    for (t, &b) in to.iter_mut().zip(b) {
        *t = *t * s + b;
    }
}

/// `to = a * s + b * t`
pub fn add_scaled2(to: &mut [Vec3], a: &[Vec3], s: f32, b: &[Vec3], t: f32) {
    debug_assert!(to.len() == a.len() && a.len() == b.len());
    for ((out, &a), &b) in to.iter_mut().zip(a).zip(b) {
        *out = a * s + b * t;
    }
}

/// Dot product over the whole array, accumulated in single precision.
pub fn dot(a: &[Vec3], b: &[Vec3]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(a, b)| a.dot(*b)).sum()
}

/// Squared L2 norm.
#[inline]
pub fn norm_sq(a: &[Vec3]) -> f32 {
    dot(a, a)
}

/// True if no component is NaN or infinite.
pub fn is_finite(a: &[Vec3]) -> bool {
    a.iter().all(|v| v.is_finite())
}
