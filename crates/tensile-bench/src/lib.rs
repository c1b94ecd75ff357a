//! # tensile-bench
//!
//! Benchmark suite for the tensile implicit solver.
//!
//! Provides two procedural scenarios (a hanging cloth sheet and a
//! horizontal hair strand), a runner that drives the full
//! clear → accumulate → constrain → solve → commit pipeline, metric
//! collection, and CSV export for regression tracking.

pub mod metrics;
pub mod runner;
pub mod scenarios;

pub use metrics::BenchmarkMetrics;
pub use runner::BenchmarkRunner;
pub use scenarios::{Scenario, ScenarioKind};
