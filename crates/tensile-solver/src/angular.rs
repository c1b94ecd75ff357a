//! Discrete angular bending between two polygon wings sharing an edge.
//!
//! Each wing is reduced to the average of its vertices. The bend angle is
//! the signed angle between the two wing normals around the shared edge;
//! a flat configuration measures zero. The kernel is explicit (no jacobian).

use glam::Vec3;
use tensile_types::constants::ALMOST_ZERO;

use crate::assembly::Assembly;
use crate::state::ImplicitData;

/// Geometry of a hinge formed by edge (`i`, `j`) and two wings.
struct Hinge {
    /// Unit wing normals, pointing in the direction that unfolds each wing.
    dir_a: Vec3,
    dir_b: Vec3,
    /// Distance of each wing average from the edge line.
    arm_a: f32,
    arm_b: f32,
    /// Wing velocities relative to the edge midpoint.
    vel_a: Vec3,
    vel_b: Vec3,
    angle: f32,
}

fn average(values: &[Vec3], indices: &[usize]) -> Vec3 {
    let sum: Vec3 = indices.iter().map(|&k| values[k]).sum();
    sum / indices.len() as f32
}

impl ImplicitData {
    fn hinge(&self, i: usize, j: usize, wing_a: &[usize], wing_b: &[usize]) -> Option<Hinge> {
        if wing_a.is_empty() || wing_b.is_empty() {
            return None;
        }

        let edge = self.x[i] - self.x[j];
        let edge_len = edge.length();
        if edge_len <= ALMOST_ZERO {
            return None;
        }
        let dir_e = edge / edge_len;

        let vec_a = average(&self.x, wing_a) - self.x[j];
        let vec_b = average(&self.x, wing_b) - self.x[j];
        let nor_a = vec_a.cross(dir_e);
        let nor_b = dir_e.cross(vec_b);
        let (arm_a, arm_b) = (nor_a.length(), nor_b.length());
        if arm_a <= ALMOST_ZERO || arm_b <= ALMOST_ZERO {
            return None;
        }
        let (dir_a, dir_b) = (nor_a / arm_a, nor_b / arm_b);

        let cos = dir_a.dot(dir_b);
        let sin = dir_b.cross(dir_a).dot(dir_e);

        let edge_vel = 0.5 * (self.v[i] + self.v[j]);
        Some(Hinge {
            dir_a,
            dir_b,
            arm_a,
            arm_b,
            vel_a: average(&self.v, wing_a) - edge_vel,
            vel_b: average(&self.v, wing_b) - edge_vel,
            angle: sin.atan2(cos),
        })
    }

    /// Current bend angle of the hinge, in radians. `None` for degenerate
    /// hinges (empty wing, zero-length edge, or a wing on the edge line).
    ///
    /// Use this to capture rest angles for [`Assembly::spring_angular`].
    pub fn dihedral_angle(
        &self,
        i: usize,
        j: usize,
        wing_a: &[usize],
        wing_b: &[usize],
    ) -> Option<f32> {
        self.hinge(i, j, wing_a, wing_b).map(|h| h.angle)
    }
}

impl Assembly<'_> {
    /// Angular spring on the hinge (`i`, `j`) between `wing_a` and
    /// `wing_b`. Returns false for degenerate hinges.
    #[allow(clippy::too_many_arguments)]
    pub fn spring_angular(
        &mut self,
        i: usize,
        j: usize,
        wing_a: &[usize],
        wing_b: &[usize],
        rest_angle: f32,
        stiffness: f32,
        damping: f32,
    ) -> bool {
        let Some(h) = self.data.hinge(i, j, wing_a, wing_b) else {
            return false;
        };

        let torque = stiffness * (h.angle - rest_angle)
            - damping * (h.vel_a.dot(h.dir_a) + h.vel_b.dot(h.dir_b));

        let f_a = h.dir_a * (torque / h.arm_a);
        let f_b = h.dir_b * (torque / h.arm_b);

        let share_a = f_a / wing_a.len() as f32;
        for &k in wing_a {
            self.add_force(k, share_a);
        }
        let share_b = f_b / wing_b.len() as f32;
        for &k in wing_b {
            self.add_force(k, share_b);
        }

        let f_edge = -0.5 * (f_a + f_b);
        self.add_force(i, f_edge);
        self.add_force(j, f_edge);
        true
    }
}
