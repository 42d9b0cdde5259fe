//! Traffic Simulator CLI
//!
//! Command-line front end for the Nagel-Schreckenberg circular-road
//! engine: single runs with a displacement summary and trace export, and
//! parameter sweeps with flow-density analysis.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use traffic_simulator_core_rs::SlowdownProbability;

use crate::commands::sweep::SweepAxisArg;

mod commands;

#[derive(Parser)]
#[command(name = "traffic-sim")]
#[command(about = "Nagel-Schreckenberg one-lane circular road traffic simulator")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation and print its displacement summary
    Run {
        /// Number of cells on the circular road
        #[arg(short = 'm', long, default_value = "100")]
        ring_size: u32,

        /// Number of recorded steps (the fixed burn-in comes on top)
        #[arg(short = 'n', long, default_value = "500")]
        steps: usize,

        /// Max velocity parameter; the attainable top speed is one below
        #[arg(long, default_value = "5")]
        max_velocity: u32,

        /// Number of vehicles on the ring
        #[arg(short = 'k', long, default_value = "30")]
        vehicles: u32,

        /// Slowdown probability as a rational like 1/3 or 1/4, or 0
        #[arg(long, default_value = "1/3")]
        slow_probability: SlowdownProbability,

        /// RNG seed; drawn from OS entropy when omitted
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write the recorded trace to a file (.json for JSON, else CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Sweep one parameter across repeated runs
    Sweep {
        /// Number of cells on the circular road
        #[arg(short = 'm', long, default_value = "100")]
        ring_size: u32,

        /// Number of recorded steps per run
        #[arg(short = 'n', long, default_value = "500")]
        steps: usize,

        /// Max velocity parameter for runs that do not sweep it
        #[arg(long, default_value = "5")]
        max_velocity: u32,

        /// Vehicle count for runs that do not sweep it
        #[arg(short = 'k', long, default_value = "30")]
        vehicles: u32,

        /// Slowdown probability for runs that do not sweep it
        #[arg(long, default_value = "1/3")]
        slow_probability: SlowdownProbability,

        /// Base seed for the per-run seed stream; OS entropy when omitted
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parameter to sweep
        #[arg(long, value_enum)]
        axis: SweepAxisArg,

        /// Swept values, comma separated (e.g. 1,3,5 or 0,1/2,1/4)
        #[arg(long, value_delimiter = ',')]
        values: Vec<String>,

        /// Vehicle-count range start:end:step with an exclusive end
        /// (e.g. 55:505:5)
        #[arg(long, conflicts_with = "values")]
        range: Option<String>,

        /// Fit a quintic to total displacement and report its peak
        #[arg(long)]
        fit: bool,

        /// Fit straight lines to both regimes of the flow-density diagram
        #[arg(long)]
        two_regime: bool,

        /// Write completed runs to a file (.json for JSON, else CSV)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Run {
            ring_size,
            steps,
            max_velocity,
            vehicles,
            slow_probability,
            seed,
            output,
        } => commands::run::run(commands::run::RunOptions {
            ring_size,
            steps,
            max_velocity,
            vehicles,
            slow_probability,
            seed,
            output,
        }),
        Commands::Sweep {
            ring_size,
            steps,
            max_velocity,
            vehicles,
            slow_probability,
            seed,
            axis,
            values,
            range,
            fit,
            two_regime,
            output,
        } => commands::sweep::run(commands::sweep::SweepOptions {
            ring_size,
            steps,
            max_velocity,
            vehicles,
            slow_probability,
            seed,
            axis,
            values,
            range,
            fit,
            two_regime,
            output,
        }),
    }
}
