//! Metrics collected during a benchmark run.

use serde::{Deserialize, Serialize};

/// Metrics collected from a benchmark scenario run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkMetrics {
    /// Scenario name.
    pub scenario: String,
    pub vertex_count: usize,
    /// Coupling blocks registered in the last timestep.
    pub coupling_count: usize,
    /// Number of timesteps executed.
    pub timesteps: u32,
    /// Total wall-clock time (seconds).
    pub total_wall_time: f64,
    /// Average wall-clock time per timestep (seconds).
    pub avg_step_time: f64,
    pub min_step_time: f64,
    pub max_step_time: f64,
    /// Final kinetic energy (should approach zero for a settled drape).
    pub final_kinetic_energy: f64,
    /// Maximum vertex displacement from the initial position.
    pub max_displacement: f32,
    /// Average conjugate gradient iterations per step.
    pub avg_iterations: f32,
    /// Largest final relative residual over all steps.
    pub max_residual: f32,
    /// Steps whose velocity solve met the tolerance.
    pub converged_steps: u32,
    /// Largest deviation from the direct reference solve, when verified.
    pub max_direct_deviation: Option<f32>,
}

impl BenchmarkMetrics {
    /// CSV header matching [`to_csv_row`](Self::to_csv_row).
    pub fn to_csv_header() -> String {
        "scenario,vertex_count,coupling_count,timesteps,total_wall_time_s,avg_step_ms,min_step_ms,max_step_ms,final_ke,max_displacement,avg_iterations,max_residual,converged_steps,max_direct_deviation".to_string()
    }

    /// Format this metrics instance as a CSV data row.
    pub fn to_csv_row(&self) -> String {
        let deviation = self
            .max_direct_deviation
            .map(|d| format!("{d:.3e}"))
            .unwrap_or_default();
        format!(
            "{},{},{},{},{:.6},{:.4},{:.4},{:.4},{:.6e},{:.6},{:.1},{:.3e},{},{}",
            self.scenario,
            self.vertex_count,
            self.coupling_count,
            self.timesteps,
            self.total_wall_time,
            self.avg_step_time * 1000.0,
            self.min_step_time * 1000.0,
            self.max_step_time * 1000.0,
            self.final_kinetic_energy,
            self.max_displacement,
            self.avg_iterations,
            self.max_residual,
            self.converged_steps,
            deviation,
        )
    }

    /// Format multiple metrics as a complete CSV string.
    pub fn to_csv(metrics: &[BenchmarkMetrics]) -> String {
        let mut csv = Self::to_csv_header();
        for m in metrics {
            csv.push('\n');
            csv.push_str(&m.to_csv_row());
        }
        csv
    }
}
