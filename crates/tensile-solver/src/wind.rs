//! Aerodynamic and pressure forces.
//!
//! All of these are explicit: they add to the force vector only. Wind
//! vectors are world-space and indexed by vertex.

use std::f32::consts::PI;

use glam::Vec3;
use tensile_types::constants::{AIR_DENSITY, FACE_WIND_SCALE};

use crate::assembly::Assembly;

/// Unit normal and area of a triangle, normal along `(v1-v2)×(v2-v3)`.
fn normal_and_area(v1: Vec3, v2: Vec3, v3: Vec3) -> (Vec3, f32) {
    let n = (v1 - v2).cross(v2 - v3);
    let len = n.length();
    if len > 0.0 {
        (n / len, 0.5 * len)
    } else {
        (Vec3::ZERO, 0.0)
    }
}

impl Assembly<'_> {
    /// Wind on a triangle: each vertex receives the component of its wind
    /// along the face normal, scaled by a third of the face area.
    pub fn force_face_wind(&mut self, v1: usize, v2: usize, v3: usize, wind: &[Vec3]) {
        let x = &self.data.x;
        let (nor, area) = normal_and_area(x[v1], x[v2], x[v3]);
        let factor = FACE_WIND_SCALE * area / 3.0;

        for i in [v1, v2, v3] {
            let w = self.data.to_local(i, wind[i]);
            self.add_force(i, nor * (factor * w.dot(nor)));
        }
    }

    /// Wind on an edge treated as a capsule with per-end radii. The
    /// presented cross-section is `r (π r sinα + len cosα)` where `α` is the
    /// angle between the wind and the edge.
    pub fn force_edge_wind(
        &mut self,
        v1: usize,
        v2: usize,
        radius1: f32,
        radius2: f32,
        wind: &[Vec3],
    ) {
        let edge = self.data.x[v1] - self.data.x[v2];
        let length = edge.length();
        let dir = edge.normalize_or_zero();

        for (i, radius) in [(v1, radius1), (v2, radius2)] {
            let w = self.data.to_local(i, wind[i]);
            let cos_alpha = w.normalize_or_zero().dot(dir).abs();
            let sin_alpha = (1.0 - cos_alpha * cos_alpha).max(0.0).sqrt();
            let cross_section = radius * (PI * radius * sin_alpha + length * cos_alpha);
            self.add_force(i, w * (AIR_DENSITY * cross_section));
        }
    }

    /// Point wind on a single vertex.
    pub fn force_vertex_wind(&mut self, i: usize, wind: &[Vec3]) {
        let w = self.data.to_local(i, wind[i]);
        self.add_force(i, w * AIR_DENSITY);
    }

    /// Uniform pressure difference across a triangle, split evenly over its
    /// vertices along the face normal.
    pub fn force_face_pressure(&mut self, v1: usize, v2: usize, v3: usize, pressure: f32) {
        let x = &self.data.x;
        let (nor, area) = normal_and_area(x[v1], x[v2], x[v3]);
        let f = nor * (pressure * area / 3.0);
        for i in [v1, v2, v3] {
            self.add_force(i, f);
        }
    }
}
