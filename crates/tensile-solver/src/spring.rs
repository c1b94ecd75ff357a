//! Two-point spring kernels: linear (stretch/compression), Choi–Ko bending,
//! and goal springs.
//!
//! The polynomial bending curve follows Choi & Ko, "Stable but Responsive
//! Cloth" (2002): a fixed quartic fit `fb` of the buckling response, bounded
//! below by a linear term so the force never becomes softer than `cb·(len-L)`.

use glam::{Mat3, Vec3};
use serde::{Deserialize, Serialize};
use tensile_math::block;
use tensile_types::constants::ALMOST_ZERO;

use crate::assembly::Assembly;

/// Behaviour of a linear spring shorter than its rest length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompressionModel {
    /// No force under compression.
    #[default]
    Slack,
    /// Linear spring in both directions, tension parameters throughout.
    Resist,
    /// Choi–Ko polynomial with the compression stiffness and damping.
    Polynomial,
}

/// Parameters of a linear spring between two vertices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearSpring {
    pub rest_length: f32,
    pub tension_stiffness: f32,
    pub tension_damping: f32,
    pub compression_stiffness: f32,
    pub compression_damping: f32,
    pub compression: CompressionModel,
    /// Upper bound on the stretch force magnitude; `<= 0` disables the clamp.
    pub clamp_force: f32,
}

impl LinearSpring {
    /// A tension-only spring (slack under compression, no clamp).
    pub fn new(rest_length: f32, stiffness: f32, damping: f32) -> Self {
        Self {
            rest_length,
            tension_stiffness: stiffness,
            tension_damping: damping,
            compression_stiffness: stiffness,
            compression_damping: damping,
            compression: CompressionModel::Slack,
            clamp_force: 0.0,
        }
    }

    pub fn with_compression(
        mut self,
        model: CompressionModel,
        stiffness: f32,
        damping: f32,
    ) -> Self {
        self.compression = model;
        self.compression_stiffness = stiffness;
        self.compression_damping = damping;
        self
    }

    pub fn with_clamp(mut self, clamp_force: f32) -> Self {
        self.clamp_force = clamp_force;
        self
    }
}

/// Quartic fit of the Choi–Ko buckling curve, `x = len / L`.
fn fb(x: f32) -> f32 {
    let (x2, x3, x4) = (x * x, x * x * x, x * x * x * x);
    -11.541 * x4 + 34.193 * x3 - 39.083 * x2 + 23.116 * x - 9.713
}

fn fb_deriv(x: f32) -> f32 {
    let (x2, x3) = (x * x, x * x * x);
    -46.164 * x3 + 102.579 * x2 - 78.166 * x + 23.116
}

/// Signed bending force magnitude: the polynomial, bounded below by the
/// linear term.
pub fn fbstar(length: f32, rest_length: f32, kb: f32, cb: f32) -> f32 {
    let poly = kb * fb(length / rest_length);
    let linear = cb * (length - rest_length);
    poly.max(linear)
}

/// Jacobian scalar (along `dir ⊗ dir`) matching the branch [`fbstar`] took.
pub fn fbstar_jacobi(length: f32, rest_length: f32, kb: f32, cb: f32) -> f32 {
    let poly = kb * fb(length / rest_length);
    let linear = cb * (length - rest_length);
    if linear > poly {
        -cb
    } else {
        -kb * fb_deriv(length / rest_length)
    }
}

/// `∂f_i/∂x_i` of a linear spring pulling `i` towards `j`:
/// `k ((I - d⊗d) L/len - I)`.
fn dfdx_spring(dir: Vec3, length: f32, rest_length: f32, k: f32) -> Mat3 {
    (block::orthogonal_projector(dir) * (rest_length / length) - Mat3::IDENTITY) * k
}

fn dfdv_damp(dir: Vec3, damping: f32) -> Mat3 {
    block::outer(dir, dir) * -damping
}

/// Unit direction, length and relative velocity from `i` to `j`.
struct SpringGeometry {
    dir: Vec3,
    length: f32,
    vel: Vec3,
}

impl Assembly<'_> {
    fn spring_geometry(&self, i: usize, j: usize) -> SpringGeometry {
        let extent = self.data.x[j] - self.data.x[i];
        let length = extent.length();
        let dir = if length > ALMOST_ZERO {
            extent / length
        } else {
            Vec3::ZERO
        };
        SpringGeometry {
            dir,
            length,
            vel: self.data.v[j] - self.data.v[i],
        }
    }

    /// Linear spring between `i` and `j`. Returns false when the spring
    /// contributes nothing this step (slack or degenerate).
    pub fn spring_linear(&mut self, i: usize, j: usize, spring: &LinearSpring) -> bool {
        let SpringGeometry { dir, length, vel } = self.spring_geometry(i, j);
        if length <= ALMOST_ZERO {
            return false;
        }
        let rest = spring.rest_length;

        let (mut f, dfdx, damping) =
            if length >= rest || spring.compression == CompressionModel::Resist {
                let k = spring.tension_stiffness;
                let mut stretch = k * (length - rest);
                if spring.clamp_force > 0.0 && stretch > spring.clamp_force {
                    stretch = spring.clamp_force;
                }
                (
                    dir * stretch,
                    dfdx_spring(dir, length, rest, k),
                    spring.tension_damping,
                )
            } else if spring.compression == CompressionModel::Polynomial {
                let kb = spring.compression_stiffness;
                let cb = kb;
                (
                    dir * fbstar(length, rest, kb, cb),
                    block::outer(dir, dir) * fbstar_jacobi(length, rest, kb, cb),
                    spring.compression_damping,
                )
            } else {
                return false;
            };

        f += dir * (damping * vel.dot(dir));
        let dfdv = dfdv_damp(dir, damping);

        self.apply_spring(i, j, f, &dfdx, &dfdv);
        true
    }

    /// Choi–Ko bending spring: acts only while `i` and `j` are closer than
    /// `rest_length`. No damping.
    pub fn spring_bending(
        &mut self,
        i: usize,
        j: usize,
        rest_length: f32,
        kb: f32,
        cb: f32,
    ) -> bool {
        let SpringGeometry { dir, length, .. } = self.spring_geometry(i, j);
        if length >= rest_length || length <= ALMOST_ZERO {
            return false;
        }

        let f = dir * fbstar(length, rest_length, kb, cb);
        let dfdx = block::outer(dir, dir) * fbstar_jacobi(length, rest_length, kb, cb);
        self.apply_spring(i, j, f, &dfdx, &Mat3::ZERO);
        true
    }

    /// Zero-rest-length spring pulling vertex `i` towards a world-space
    /// goal position and velocity. Returns false when the vertex already
    /// sits on the goal.
    pub fn spring_goal(
        &mut self,
        i: usize,
        goal_x: Vec3,
        goal_v: Vec3,
        stiffness: f32,
        damping: f32,
    ) -> bool {
        let root_goal_x = self.data.to_local(i, goal_x);
        let root_goal_v = self.data.to_local(i, goal_v);

        let extent = root_goal_x - self.data.x[i];
        let length = extent.length();
        if length <= ALMOST_ZERO {
            return false;
        }
        let dir = extent / length;
        let vel = root_goal_v - self.data.v[i];

        let f = dir * (stiffness * length) + dir * (damping * vel.dot(dir));
        let dfdx = dfdx_spring(dir, length, 0.0, stiffness);
        let dfdv = dfdv_damp(dir, damping);

        self.add_force(i, f);
        self.add_diagonal(i, &dfdx, &dfdv);
        true
    }
}
