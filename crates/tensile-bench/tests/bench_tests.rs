//! Integration tests for tensile-bench.

use tensile_bench::metrics::BenchmarkMetrics;
use tensile_bench::runner::BenchmarkRunner;
use tensile_bench::scenarios::{Scenario, ScenarioKind};
use tensile_solver::{Preconditioner, SolverConfig};
use tensile_telemetry::{EventBus, EventKind, VecSink};

// ─── Scenario Tests ───────────────────────────────────────────

#[test]
fn cloth_sheet_setup() {
    let s = Scenario::cloth_sheet();
    assert_eq!(s.kind, ScenarioKind::ClothSheet);
    assert_eq!(s.vertex_count(), 441); // 21×21
    assert_eq!(s.faces.len(), 800); // 20×20×2
    // structural 2·20·21, shear 2·20·20
    assert_eq!(s.stretch.len(), 840 + 800);
    assert_eq!(s.bending.len(), 2 * 19 * 21);
    assert_eq!(s.pinned.len(), 21);
    assert!(s.hair_bending.is_empty());
}

#[test]
fn hair_strand_setup() {
    let s = Scenario::hair_strand();
    assert_eq!(s.kind, ScenarioKind::HairStrand);
    assert_eq!(s.vertex_count(), 16);
    assert_eq!(s.stretch.len(), 15);
    assert_eq!(s.hair_bending.len(), 14);
    assert_eq!(s.wind_edges.len(), 15);
    assert_eq!(s.pinned, vec![0]);
    assert_eq!(s.spring_capacity(), 15 + 14 * 3);
}

#[test]
fn all_scenarios() {
    assert_eq!(ScenarioKind::all().len(), 2);
}

#[test]
fn scenario_names_parse() {
    for &kind in ScenarioKind::all() {
        assert_eq!(kind.name().parse::<ScenarioKind>().unwrap(), kind);
    }
    assert!("sphere_drape".parse::<ScenarioKind>().is_err());
}

#[test]
fn initial_state_is_at_rest() {
    let s = Scenario::hair_strand_sized(5);
    let data = s.build_state().unwrap();
    for (i, &x) in s.positions.iter().enumerate() {
        assert!((data.position(i) - x).length() < 1e-6);
        assert!(data.velocity(i).length() < 1e-6);
    }
    assert!(data.kinetic_energy().abs() < 1e-9);
}

#[test]
fn hair_goals_at_rest_match_rest_edges() {
    let s = Scenario::hair_strand_sized(6);
    let data = s.build_state().unwrap();
    let goals = s.hair_goals(&data);
    assert_eq!(goals.len(), s.hair_bending.len());
    for (goal, h) in goals.iter().zip(&s.hair_bending) {
        assert!((*goal - h.rest_edge).length() < 1e-5);
    }
}

// ─── Runner Tests ─────────────────────────────────────────────

#[test]
fn run_small_cloth_sheet() {
    let mut scenario = Scenario::cloth_sheet_sized(4, 4);
    scenario.timesteps = 3;
    let metrics = BenchmarkRunner::new().run(&scenario).unwrap();

    assert_eq!(metrics.scenario, "cloth_sheet");
    assert_eq!(metrics.vertex_count, 25);
    assert_eq!(metrics.timesteps, 3);
    assert!(metrics.total_wall_time > 0.0);
    assert!(metrics.max_displacement > 0.0); // Gravity should cause displacement
    assert!(metrics.final_kinetic_energy > 0.0);
    assert!(metrics.coupling_count > 0);
    assert!(metrics.max_direct_deviation.is_none());
}

#[test]
fn run_hair_strand() {
    let mut scenario = Scenario::hair_strand_sized(8);
    scenario.timesteps = 5;
    let metrics = BenchmarkRunner::new().run(&scenario).unwrap();

    assert_eq!(metrics.scenario, "hair_strand");
    assert_eq!(metrics.timesteps, 5);
    assert_eq!(metrics.converged_steps, 5);
    assert!(metrics.avg_iterations >= 1.0);
    assert!(metrics.max_displacement > 0.0);
    assert!(metrics.min_step_time <= metrics.max_step_time);
}

#[test]
fn block_jacobi_run_converges() {
    let config = SolverConfig {
        preconditioner: Preconditioner::BlockJacobi,
        ..SolverConfig::default()
    };
    let mut scenario = Scenario::cloth_sheet_sized(3, 3).with_config(config);
    scenario.timesteps = 2;
    let metrics = BenchmarkRunner::new().run(&scenario).unwrap();
    assert_eq!(metrics.converged_steps, 2);
}

#[test]
fn verification_matches_direct_solver() {
    let config = SolverConfig {
        epsilon: 1e-4,
        ..SolverConfig::default()
    };
    let mut scenario = Scenario::hair_strand_sized(6).with_config(config);
    scenario.timesteps = 2;
    let metrics = BenchmarkRunner::new()
        .with_verification(true)
        .run(&scenario)
        .unwrap();

    let deviation = metrics.max_direct_deviation.unwrap();
    assert!(deviation < 1e-3, "deviation {deviation}");
}

#[test]
fn runner_feeds_event_bus() {
    let sink = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(sink.clone()));

    let mut scenario = Scenario::hair_strand_sized(5);
    scenario.timesteps = 3;
    BenchmarkRunner::new().with_bus(&mut bus).run(&scenario).unwrap();

    let events = sink.events();
    let count = |pred: fn(&EventKind) -> bool| events.iter().filter(|e| pred(&e.kind)).count();
    assert_eq!(count(|k| matches!(k, EventKind::TimestepBegin { .. })), 3);
    assert_eq!(count(|k| matches!(k, EventKind::TimestepEnd { .. })), 3);
    assert_eq!(count(|k| matches!(k, EventKind::Convergence { .. })), 3);
    assert_eq!(count(|k| matches!(k, EventKind::Energy { .. })), 3);
    // At least the initial residual per step.
    assert!(count(|k| matches!(k, EventKind::SolverIteration { .. })) >= 3);

    assert_eq!(events[0].timestep, 0);
    assert!(matches!(events[0].kind, EventKind::TimestepBegin { .. }));
    assert_eq!(events.last().unwrap().timestep, 2);
}

#[test]
fn disabled_bus_receives_nothing() {
    let sink = VecSink::new();
    let mut bus = EventBus::new();
    bus.add_sink(Box::new(sink.clone()));
    bus.set_enabled(false);

    let mut scenario = Scenario::hair_strand_sized(4);
    scenario.timesteps = 2;
    BenchmarkRunner::new().with_bus(&mut bus).run(&scenario).unwrap();

    assert!(sink.is_empty());
}

// ─── Metrics Tests ────────────────────────────────────────────

fn sample_metrics() -> BenchmarkMetrics {
    BenchmarkMetrics {
        scenario: "test".into(),
        vertex_count: 441,
        coupling_count: 2438,
        timesteps: 100,
        total_wall_time: 1.5,
        avg_step_time: 0.015,
        min_step_time: 0.01,
        max_step_time: 0.02,
        final_kinetic_energy: 1e-5,
        max_displacement: 0.5,
        avg_iterations: 10.0,
        max_residual: 0.008,
        converged_steps: 100,
        max_direct_deviation: None,
    }
}

#[test]
fn metrics_csv_output() {
    let csv = BenchmarkMetrics::to_csv(&[sample_metrics()]);
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("scenario,"));
    assert!(lines[1].starts_with("test,441,2438,100,"));
    assert_eq!(
        lines[0].split(',').count(),
        lines[1].split(',').count(),
        "header and row column counts differ"
    );
    // Missing deviation is an empty trailing column.
    assert!(lines[1].ends_with(','));
}

#[test]
fn metrics_csv_with_deviation() {
    let mut m = sample_metrics();
    m.max_direct_deviation = Some(2.5e-4);
    let row = m.to_csv_row();
    assert!(row.ends_with("2.500e-4"));
}

#[test]
fn metrics_json_round_trip() {
    let m = sample_metrics();
    let json = serde_json::to_string(&m).unwrap();
    let back: BenchmarkMetrics = serde_json::from_str(&json).unwrap();
    assert_eq!(back, m);
}
