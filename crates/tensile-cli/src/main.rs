//! Tensile CLI: benchmarking and config validation for the implicit solver.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "tensile")]
#[command(version, about = "Tensile: implicit mass-spring integrator for cloth and hair")]
struct Cli {
    /// Log filter used when RUST_LOG is unset.
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run benchmark suite.
    Benchmark {
        /// Which scenario to run (cloth_sheet, hair_strand, all).
        #[arg(short, long, default_value = "all")]
        scenario: String,

        /// Output CSV file path.
        #[arg(short, long)]
        output: Option<String>,

        /// Check every velocity solve against the direct solver.
        #[arg(long)]
        verify: bool,

        /// Log per-step telemetry through tracing.
        #[arg(long)]
        telemetry: bool,
    },

    /// Validate a solver config file.
    Validate {
        /// Path to solver config (TOML).
        path: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Benchmark {
            scenario,
            output,
            verify,
            telemetry,
        } => commands::benchmark(&scenario, output.as_deref(), verify, telemetry),
        Commands::Validate { path } => commands::validate(&path),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
