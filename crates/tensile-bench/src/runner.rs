//! Benchmark runner. Drives scenarios through the implicit pipeline and
//! collects metrics.

use std::time::Instant;

use glam::{Mat3, Vec3};
use tensile_math::direct::{BlockSolver, DirectSolver};
use tensile_math::lfvector;
use tensile_solver::{ImplicitData, SolverStatus};
use tensile_telemetry::{EventBus, EventKind, SimulationEvent};
use tensile_types::{BlockId, TensileResult};

use crate::metrics::BenchmarkMetrics;
use crate::scenarios::{Scenario, ScenarioKind};

/// Runs benchmark scenarios and collects metrics.
///
/// Optionally forwards per-step and per-iteration telemetry to an
/// [`EventBus`], and checks every velocity solve against a direct
/// factorization.
#[derive(Default)]
pub struct BenchmarkRunner<'a> {
    bus: Option<&'a mut EventBus>,
    verify: bool,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward telemetry to `bus`; it is flushed at the end of every step.
    pub fn with_bus(mut self, bus: &'a mut EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Compare each conjugate gradient solve against the direct solver.
    pub fn with_verification(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    fn emit(&self, timestep: u32, kind: EventKind) {
        if let Some(bus) = &self.bus {
            bus.emit(SimulationEvent::new(timestep, kind));
        }
    }

    fn flush(&mut self) {
        if let Some(bus) = self.bus.as_deref_mut() {
            bus.flush();
        }
    }

    /// Run a single scenario and return metrics for the completed run.
    pub fn run(&mut self, scenario: &Scenario) -> TensileResult<BenchmarkMetrics> {
        let mut data = scenario.build_state()?;
        let n = scenario.vertex_count();
        let wind = vec![scenario.wind; n];
        let emitter = self.bus.as_ref().map(|bus| bus.emitter());

        let mut step_times: Vec<f64> = Vec::with_capacity(scenario.timesteps as usize);
        let mut total_iterations: u64 = 0;
        let mut max_residual = 0.0f32;
        let mut converged_steps = 0u32;
        let mut max_deviation: Option<f32> = None;

        tracing::info!(
            scenario = scenario.kind.name(),
            vertices = n,
            timesteps = scenario.timesteps,
            "running benchmark"
        );
        let total_start = Instant::now();

        for step in 0..scenario.timesteps {
            let step_start = Instant::now();
            self.emit(
                step,
                EventKind::TimestepBegin {
                    sim_time: step as f64 * scenario.dt as f64,
                },
            );

            let goals = scenario.hair_goals(&data);
            {
                let mut asm = data.clear_forces();
                scenario.apply_forces(&mut asm, &goals, &wind);
            }
            scenario.apply_constraints(&mut data);

            let result = data.solve_velocities_with(scenario.dt, |it| {
                if let Some(emitter) = &emitter {
                    emitter.emit(SimulationEvent::new(
                        step,
                        EventKind::SolverIteration {
                            iteration: it.iteration,
                            residual: it.residual as f64,
                        },
                    ));
                }
            });

            if self.verify {
                let deviation = direct_deviation(&data, &scenario.pinned)?;
                max_deviation = Some(max_deviation.map_or(deviation, |m| m.max(deviation)));
            }

            data.solve_positions(scenario.dt);
            data.apply_result();

            total_iterations += u64::from(result.iterations);
            max_residual = max_residual.max(result.error);
            if result.status == SolverStatus::Success {
                converged_steps += 1;
            } else {
                tracing::warn!(
                    scenario = scenario.kind.name(),
                    step,
                    status = ?result.status,
                    error = result.error,
                    "velocity solve did not converge"
                );
            }

            let wall_time = step_start.elapsed().as_secs_f64();
            step_times.push(wall_time);

            self.emit(
                step,
                EventKind::Convergence {
                    iterations: result.iterations,
                    final_residual: result.error as f64,
                    status: result.status,
                },
            );
            self.emit(
                step,
                EventKind::Energy {
                    kinetic: data.kinetic_energy() as f64,
                },
            );
            self.emit(step, EventKind::TimestepEnd { wall_time });
            self.flush();
        }

        let total_wall_time = total_start.elapsed().as_secs_f64();

        let max_displacement = scenario
            .positions
            .iter()
            .enumerate()
            .map(|(i, &x0)| (data.position(i) - x0).length())
            .fold(0.0f32, f32::max);

        let avg_step = if step_times.is_empty() {
            0.0
        } else {
            step_times.iter().sum::<f64>() / step_times.len() as f64
        };
        let min_step = step_times.iter().copied().fold(f64::MAX, f64::min);
        let max_step = step_times.iter().copied().fold(0.0, f64::max);
        let avg_iter = if scenario.timesteps > 0 {
            total_iterations as f32 / scenario.timesteps as f32
        } else {
            0.0
        };

        Ok(BenchmarkMetrics {
            scenario: scenario.kind.name().to_string(),
            vertex_count: n,
            coupling_count: data.coupling_count(),
            timesteps: scenario.timesteps,
            total_wall_time,
            avg_step_time: avg_step,
            min_step_time: if step_times.is_empty() { 0.0 } else { min_step },
            max_step_time: max_step,
            final_kinetic_energy: data.kinetic_energy() as f64,
            max_displacement,
            avg_iterations: avg_iter,
            max_residual,
            converged_steps,
            max_direct_deviation: max_deviation,
        })
    }

    /// Run all scenarios and return metrics for each.
    pub fn run_all(&mut self) -> TensileResult<Vec<BenchmarkMetrics>> {
        let mut results = Vec::new();
        for &kind in ScenarioKind::all() {
            let scenario = Scenario::from_kind(kind);
            results.push(self.run(&scenario)?);
        }
        Ok(results)
    }
}

/// Largest per-vertex difference between the last velocity increment and a
/// direct solve of the same system.
///
/// Pinned vertices (fully locked, ndof0) are eliminated from the direct
/// system: their increment is the constraint seed, moved to the right-hand
/// side. Partially locked vertices are not supported.
pub fn direct_deviation(data: &ImplicitData, pinned: &[usize]) -> TensileResult<f32> {
    let n = data.vertex_count();
    let mut is_pinned = vec![false; n];
    for &p in pinned {
        is_pinned[p] = true;
    }

    let seed: Vec<Vec3> = (0..n).map(|i| data.constraint_seed(i)).collect();
    let a_seed = data.system_matrix().mul(&seed);
    let mut rhs = lfvector::zeroed(n);
    lfvector::sub(&mut rhs, data.rhs(), &a_seed);

    let mut reduced = data.system_matrix().clone();
    for k in 0..reduced.offdiag_count() {
        let id = BlockId((n + k) as u32);
        let block = *reduced.block(id);
        if is_pinned[block.row as usize] || is_pinned[block.col as usize] {
            *reduced.block_mut(id) = Mat3::ZERO;
        }
    }
    for &p in pinned {
        *reduced.diag_mut(p) = Mat3::IDENTITY;
        rhs[p] = Vec3::ZERO;
    }

    let mut direct = DirectSolver::new();
    direct.factorize(&reduced)?;
    let mut free = lfvector::zeroed(n);
    direct.solve(&rhs, &mut free)?;

    let deviation = data
        .velocity_increment()
        .iter()
        .zip(free.iter().zip(&seed))
        .map(|(&dv, (&x, &z))| (dv - (x + z)).length())
        .fold(0.0f32, f32::max);
    Ok(deviation)
}
