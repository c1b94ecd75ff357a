//! Benchmark scenarios: procedural geometry, force elements, pinning and
//! solver configuration for each test case.
//!
//! 1. **Cloth sheet**: grid pinned along its top edge, structural, shear
//!    and bending springs, draping under gravity with drag and face wind.
//! 2. **Hair strand**: horizontal chain pinned at the root, stretch
//!    springs and hair bending goals, sagging under gravity in edge wind.

use std::str::FromStr;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tensile_solver::{Assembly, CompressionModel, ImplicitData, LinearSpring, SolverConfig};
use tensile_types::constants::DEFAULT_DT;
use tensile_types::{TensileError, TensileResult};

/// Which benchmark scenario to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    /// Cloth pinned at its top edge, hanging under gravity.
    ClothSheet,
    /// Hair strand pinned at the root, sagging under gravity.
    HairStrand,
}

impl ScenarioKind {
    /// Returns all scenario kinds.
    pub fn all() -> &'static [ScenarioKind] {
        &[ScenarioKind::ClothSheet, ScenarioKind::HairStrand]
    }

    /// Returns a human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::ClothSheet => "cloth_sheet",
            ScenarioKind::HairStrand => "hair_strand",
        }
    }
}

impl FromStr for ScenarioKind {
    type Err = TensileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| TensileError::InvalidInput(format!("unknown scenario '{s}'")))
    }
}

/// A linear spring between two vertices.
#[derive(Debug, Clone, Copy)]
pub struct StretchElement {
    pub i: usize,
    pub j: usize,
    pub spring: LinearSpring,
}

/// A Choi–Ko bending spring across one vertex.
#[derive(Debug, Clone, Copy)]
pub struct BendElement {
    pub i: usize,
    pub j: usize,
    pub rest_length: f32,
    pub stiffness: f32,
}

/// A hair bending goal on three consecutive vertices.
#[derive(Debug, Clone, Copy)]
pub struct HairBendElement {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    /// Rest edges `j - i` and `k - j`.
    pub rest_parent: Vec3,
    pub rest_edge: Vec3,
    pub stiffness: f32,
    pub damping: f32,
}

/// A fully specified benchmark scenario.
pub struct Scenario {
    pub kind: ScenarioKind,
    /// Initial (rest) world positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex mass (kg).
    pub vertex_mass: f32,
    pub stretch: Vec<StretchElement>,
    pub bending: Vec<BendElement>,
    pub hair_bending: Vec<HairBendElement>,
    /// Triangles receiving face wind.
    pub faces: Vec<[usize; 3]>,
    /// Edges receiving edge wind, with the strand radius.
    pub wind_edges: Vec<(usize, usize)>,
    pub edge_radius: f32,
    /// Vertices locked in place (ndof0, zero velocity).
    pub pinned: Vec<usize>,
    /// Uniform world-space wind velocity.
    pub wind: Vec3,
    /// Viscous air drag coefficient.
    pub drag: f32,
    pub config: SolverConfig,
    /// Number of timesteps to simulate.
    pub timesteps: u32,
    /// Timestep size (seconds).
    pub dt: f32,
}

impl Scenario {
    /// A 1m × 1m sheet at 20×20 resolution in the XZ plane at Y = 1,
    /// pinned along its first row, hanging for 2 seconds at 60fps.
    pub fn cloth_sheet() -> Self {
        Self::cloth_sheet_sized(20, 20)
    }

    /// Cloth sheet with `cols × rows` cells over 1m × 1m.
    pub fn cloth_sheet_sized(cols: usize, rows: usize) -> Self {
        let (nx, nz) = (cols + 1, rows + 1);
        let dx = 1.0 / cols as f32;
        let dz = 1.0 / rows as f32;
        let index = |c: usize, r: usize| r * nx + c;

        let mut positions = Vec::with_capacity(nx * nz);
        for r in 0..nz {
            for c in 0..nx {
                positions.push(Vec3::new(c as f32 * dx, 1.0, r as f32 * dz));
            }
        }

        let structural = |rest: f32| {
            LinearSpring::new(rest, 50.0, 0.05).with_compression(
                CompressionModel::Polynomial,
                50.0,
                0.05,
            )
        };
        let shear_rest = (dx * dx + dz * dz).sqrt();
        let shear = LinearSpring::new(shear_rest, 5.0, 0.01);

        let mut stretch = Vec::new();
        let mut bending = Vec::new();
        let mut faces = Vec::new();
        for r in 0..nz {
            for c in 0..nx {
                let i = index(c, r);
                if c + 1 < nx {
                    stretch.push(StretchElement {
                        i,
                        j: index(c + 1, r),
                        spring: structural(dx),
                    });
                }
                if r + 1 < nz {
                    stretch.push(StretchElement {
                        i,
                        j: index(c, r + 1),
                        spring: structural(dz),
                    });
                }
                if c + 1 < nx && r + 1 < nz {
                    stretch.push(StretchElement {
                        i,
                        j: index(c + 1, r + 1),
                        spring: shear,
                    });
                    stretch.push(StretchElement {
                        i: index(c + 1, r),
                        j: index(c, r + 1),
                        spring: shear,
                    });
                    faces.push([i, index(c + 1, r), index(c + 1, r + 1)]);
                    faces.push([i, index(c + 1, r + 1), index(c, r + 1)]);
                }
                if c + 2 < nx {
                    bending.push(BendElement {
                        i,
                        j: index(c + 2, r),
                        rest_length: 2.0 * dx,
                        stiffness: 0.5,
                    });
                }
                if r + 2 < nz {
                    bending.push(BendElement {
                        i,
                        j: index(c, r + 2),
                        rest_length: 2.0 * dz,
                        stiffness: 0.5,
                    });
                }
            }
        }

        Self {
            kind: ScenarioKind::ClothSheet,
            positions,
            vertex_mass: 0.002,
            stretch,
            bending,
            hair_bending: Vec::new(),
            faces,
            wind_edges: Vec::new(),
            edge_radius: 0.0,
            pinned: (0..nx).collect(),
            wind: Vec3::new(0.0, 0.0, 2.0),
            drag: 0.001,
            config: SolverConfig::default(),
            timesteps: 120,
            dt: DEFAULT_DT,
        }
    }

    /// A 30cm strand of 16 vertices laid along +X from a root at Y = 1,
    /// sagging for 2 seconds at 60fps.
    pub fn hair_strand() -> Self {
        Self::hair_strand_sized(16)
    }

    /// Hair strand with `vertices` vertices over 30cm.
    pub fn hair_strand_sized(vertices: usize) -> Self {
        let segment = 0.3 / (vertices.max(2) - 1) as f32;
        let positions: Vec<Vec3> = (0..vertices)
            .map(|i| Vec3::new(i as f32 * segment, 1.0, 0.0))
            .collect();

        let spring = LinearSpring::new(segment, 20.0, 0.01)
            .with_compression(CompressionModel::Resist, 20.0, 0.01);
        let stretch = (0..vertices.saturating_sub(1))
            .map(|i| StretchElement { i, j: i + 1, spring })
            .collect();

        let hair_bending = (0..vertices.saturating_sub(2))
            .map(|i| HairBendElement {
                i,
                j: i + 1,
                k: i + 2,
                rest_parent: positions[i + 1] - positions[i],
                rest_edge: positions[i + 2] - positions[i + 1],
                stiffness: 2.0,
                damping: 0.005,
            })
            .collect();

        Self {
            kind: ScenarioKind::HairStrand,
            vertex_mass: 0.0005,
            stretch,
            bending: Vec::new(),
            hair_bending,
            faces: Vec::new(),
            wind_edges: (0..vertices.saturating_sub(1)).map(|i| (i, i + 1)).collect(),
            edge_radius: 0.002,
            pinned: if vertices > 0 { vec![0] } else { Vec::new() },
            wind: Vec3::new(0.0, 0.0, 3.0),
            drag: 0.0005,
            positions,
            config: SolverConfig::default(),
            timesteps: 120,
            dt: DEFAULT_DT,
        }
    }

    /// Create a scenario by kind.
    pub fn from_kind(kind: ScenarioKind) -> Self {
        match kind {
            ScenarioKind::ClothSheet => Self::cloth_sheet(),
            ScenarioKind::HairStrand => Self::hair_strand(),
        }
    }

    /// Replaces the solver configuration.
    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Upper bound on the vertex pairs coupled in one timestep.
    pub fn spring_capacity(&self) -> usize {
        self.stretch.len() + self.bending.len() + self.hair_bending.len() * 3
    }

    /// Allocates solver state at rest in the initial configuration.
    pub fn build_state(&self) -> TensileResult<ImplicitData> {
        let mut data = ImplicitData::with_config(
            self.vertex_count(),
            self.spring_capacity(),
            self.config.clone(),
        )?;
        for (i, &x) in self.positions.iter().enumerate() {
            data.set_vertex_mass(i, self.vertex_mass);
            data.set_motion_state(i, x, Vec3::ZERO);
        }
        Ok(data)
    }

    /// Hair bending goals for the current state: each rest edge is carried
    /// along by the rotation of its parent edge.
    pub fn hair_goals(&self, data: &ImplicitData) -> Vec<Vec3> {
        self.hair_bending
            .iter()
            .map(|h| {
                let parent = data.position(h.j) - data.position(h.i);
                let rotation = match (h.rest_parent.try_normalize(), parent.try_normalize()) {
                    (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
                    _ => Quat::IDENTITY,
                };
                rotation * h.rest_edge
            })
            .collect()
    }

    /// Runs every force kernel of the scenario on an open assembly.
    pub fn apply_forces(&self, asm: &mut Assembly<'_>, hair_goals: &[Vec3], wind: &[Vec3]) {
        for s in &self.stretch {
            asm.spring_linear(s.i, s.j, &s.spring);
        }
        for b in &self.bending {
            asm.spring_bending(b.i, b.j, b.rest_length, b.stiffness, b.stiffness);
        }
        for (h, &goal) in self.hair_bending.iter().zip(hair_goals) {
            asm.spring_bending_hair(h.i, h.j, h.k, goal, h.stiffness, h.damping);
        }

        let g = Vec3::from(self.config.gravity);
        for i in 0..self.vertex_count() {
            asm.force_gravity(i, g);
        }
        asm.force_drag(self.drag);

        for &[a, b, c] in &self.faces {
            asm.force_face_wind(a, b, c, wind);
        }
        for &(a, b) in &self.wind_edges {
            asm.force_edge_wind(a, b, self.edge_radius, self.edge_radius, wind);
        }
    }

    /// Resets constraints and pins every fixed vertex at zero velocity.
    pub fn apply_constraints(&self, data: &mut ImplicitData) {
        data.clear_constraints();
        for &p in &self.pinned {
            data.add_constraint_ndof0(p, Vec3::ZERO);
        }
    }
}
