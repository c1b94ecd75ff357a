//! CLI command implementations.

use tensile_bench::metrics::BenchmarkMetrics;
use tensile_bench::runner::BenchmarkRunner;
use tensile_bench::scenarios::{Scenario, ScenarioKind};
use tensile_solver::SolverConfig;
use tensile_telemetry::{EventBus, TracingSink};

/// Run benchmark suite.
pub fn benchmark(
    scenario_name: &str,
    output_path: Option<&str>,
    verify: bool,
    telemetry: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tensile Benchmark Suite");
    println!("═══════════════════════");
    println!();

    let scenarios: Vec<ScenarioKind> = if scenario_name == "all" {
        ScenarioKind::all().to_vec()
    } else {
        match scenario_name.parse::<ScenarioKind>() {
            Ok(kind) => vec![kind],
            Err(e) => {
                let available: Vec<&str> = ScenarioKind::all().iter().map(|k| k.name()).collect();
                eprintln!("Available: {}, all", available.join(", "));
                return Err(e.into());
            }
        }
    };

    let mut bus = EventBus::new();
    bus.add_sink(Box::new(TracingSink::summary_only()));
    bus.set_enabled(telemetry);

    let mut runner = BenchmarkRunner::new()
        .with_bus(&mut bus)
        .with_verification(verify);

    let mut all_metrics = Vec::new();
    for &kind in &scenarios {
        let scenario = Scenario::from_kind(kind);

        println!(
            "Running: {} ({} verts, {} couplings max, {} steps)",
            kind.name(),
            scenario.vertex_count(),
            scenario.spring_capacity(),
            scenario.timesteps,
        );

        let metrics = runner
            .run(&scenario)
            .map_err(|e| format!("Benchmark failed: {e}"))?;

        println!("  Wall time:     {:.3}s", metrics.total_wall_time);
        println!("  Avg step:      {:.3}ms", metrics.avg_step_time * 1000.0);
        println!("  Avg CG iters:  {:.1}", metrics.avg_iterations);
        println!(
            "  Converged:     {}/{}",
            metrics.converged_steps, metrics.timesteps
        );
        println!("  Final KE:      {:.6e}", metrics.final_kinetic_energy);
        println!("  Max displace:  {:.4}m", metrics.max_displacement);
        if let Some(deviation) = metrics.max_direct_deviation {
            println!("  Direct dev:    {deviation:.3e}");
        }
        println!();

        all_metrics.push(metrics);
    }
    drop(runner);
    bus.finalize();

    // Output CSV
    if let Some(path) = output_path {
        let csv = BenchmarkMetrics::to_csv(&all_metrics);
        std::fs::write(path, &csv)?;
        println!("Results written to: {path}");
    } else {
        println!("CSV Output:");
        println!("{}", BenchmarkMetrics::to_csv(&all_metrics));
    }

    Ok(())
}

/// Validate a solver config.
pub fn validate(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    println!("Tensile Validator");
    println!("─────────────────");
    println!();

    if !path.ends_with(".toml") {
        return Err(format!("Unsupported file type: {path} (expected .toml)").into());
    }

    println!("Validating config: {path}");
    let content = std::fs::read_to_string(path)?;
    let config: SolverConfig = toml::from_str(&content)?;
    config.validate()?;
    tracing::debug!(path, ?config, "solver config parsed");

    println!("  Max iterations:  {}", config.max_iterations);
    println!("  Epsilon:         {:e}", config.epsilon);
    println!("  Preconditioner:  {:?}", config.preconditioner);
    println!("✅ Config is valid.");
    Ok(())
}
