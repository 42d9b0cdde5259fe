//! Single-run command: simulate once, print the per-vehicle and total
//! displacement summary, and optionally export the recorded trace.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;
use traffic_simulator_core_rs::analysis::flow;
use traffic_simulator_core_rs::{RunTrace, Simulation, SimulationParams, SlowdownProbability};

use crate::commands::{create_output, resolve_seed, wants_json};

/// Everything the run command needs
pub struct RunOptions {
    pub ring_size: u32,
    pub steps: usize,
    pub max_velocity: u32,
    pub vehicles: u32,
    pub slow_probability: SlowdownProbability,
    pub seed: Option<u64>,
    pub output: Option<PathBuf>,
}

pub fn run(options: RunOptions) -> Result<()> {
    let seed = resolve_seed(options.seed)?;
    let params = SimulationParams::new(
        options.ring_size,
        options.steps,
        options.max_velocity,
        options.vehicles,
        seed,
    )
    .with_slow_probability(options.slow_probability);

    info!(
        "running {} vehicles on {} cells for {} recorded steps (seed {})",
        params.vehicle_count, params.ring_size, params.steps, params.seed
    );
    let trace = Simulation::new(params.clone())?.run();

    println!(
        "Ring of {} cells, {} vehicles, max velocity {}, slowdown {}, seed {}",
        params.ring_size,
        params.vehicle_count,
        params.max_velocity,
        params.slow_probability,
        params.seed
    );
    for (index, displacement) in trace.displacement_per_vehicle().iter().enumerate() {
        println!("  vehicle {:>4}: {:>10} cells", index, displacement);
    }
    let total = trace.total_displacement();
    println!(
        "Total displacement over {} steps: {} cells (flow {:.4})",
        trace.steps(),
        total,
        flow(total, params.ring_size, params.steps)
    );

    if let Some(path) = &options.output {
        if wants_json(path) {
            write_json(path, &trace)?;
        } else {
            write_csv(path, &trace)?;
        }
        println!("Trace written to {}", path.display());
    }
    Ok(())
}

fn write_json(path: &Path, trace: &RunTrace) -> Result<()> {
    let mut writer = create_output(path)?;
    serde_json::to_writer_pretty(&mut writer, trace)
        .with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

/// One line per recorded step, one column per vehicle
fn write_csv(path: &Path, trace: &RunTrace) -> Result<()> {
    let mut writer = create_output(path)?;
    let header: Vec<String> = (0..trace.vehicle_count())
        .map(|index| format!("pos{}", index))
        .collect();
    writeln!(writer, "step,{}", header.join(","))?;
    for (step, row) in trace.rows().enumerate() {
        let cells: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        writeln!(writer, "{},{}", step, cells.join(","))?;
    }
    writer.flush()?;
    Ok(())
}
