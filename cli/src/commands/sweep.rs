//! Sweep command: repeat the simulation across one swept parameter,
//! print the flow-density table, run the optional fits, and export the
//! results.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use tracing::info;
use traffic_simulator_core_rs::{
    split_by_regime, CurveFitter, CurveModel, GoldenSectionMinimizer, LeastSquaresFitter,
    Minimizer, Polynomial, SimulationParams, SlowdownProbability, SweepAxis, SweepConfig,
    SweepDriver, SweepOutcome,
};

use crate::commands::{create_output, resolve_seed, wants_json};

/// Parameter a sweep varies
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum SweepAxisArg {
    /// Number of vehicles on the ring
    Vehicles,
    /// Max velocity parameter
    MaxVelocity,
    /// Slowdown probability
    SlowProbability,
}

/// Everything the sweep command needs
pub struct SweepOptions {
    pub ring_size: u32,
    pub steps: usize,
    pub max_velocity: u32,
    pub vehicles: u32,
    pub slow_probability: SlowdownProbability,
    pub seed: Option<u64>,
    pub axis: SweepAxisArg,
    pub values: Vec<String>,
    pub range: Option<String>,
    pub fit: bool,
    pub two_regime: bool,
    pub output: Option<PathBuf>,
}

pub fn run(options: SweepOptions) -> Result<()> {
    let axis = build_axis(&options)?;
    if options.two_regime && options.axis != SweepAxisArg::Vehicles {
        bail!("--two-regime needs a vehicle-count sweep at fixed max velocity");
    }

    let seed = resolve_seed(options.seed)?;
    let base = SimulationParams::new(
        options.ring_size,
        options.steps,
        options.max_velocity,
        options.vehicles,
        seed,
    )
    .with_slow_probability(options.slow_probability);
    info!("sweeping {} values (base seed {})", axis.len(), seed);

    // Ctrl-C finishes the run in flight and skips the rest
    let cancel = Arc::new(AtomicBool::new(false));
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        handler_flag.store(true, Ordering::SeqCst);
    })?;

    let outcome = SweepDriver::new(SweepConfig { base, axis }).run_with_cancel(&cancel);

    print_table(&outcome);
    if cancel.load(Ordering::SeqCst) {
        println!(
            "Interrupted: {} runs completed, {} skipped",
            outcome.runs.len(),
            outcome.skipped.len()
        );
    }

    if options.fit {
        report_displacement_peak(&outcome)?;
    }
    if options.two_regime {
        report_two_regime(&outcome, options.max_velocity)?;
    }
    if let Some(path) = &options.output {
        export(&outcome, path)?;
        println!("Results written to {}", path.display());
    }
    Ok(())
}

/// Turn the axis choice and value strings into a concrete sweep axis
fn build_axis(options: &SweepOptions) -> Result<SweepAxis> {
    match options.axis {
        SweepAxisArg::Vehicles => {
            if let Some(range) = &options.range {
                let (start, end, step) = parse_range(range)?;
                return Ok(SweepAxis::vehicle_count_range(start, end, step));
            }
            Ok(SweepAxis::VehicleCount(parse_values(
                &options.values,
                "vehicle count",
            )?))
        }
        SweepAxisArg::MaxVelocity => {
            if options.range.is_some() {
                bail!("--range only applies to a vehicle-count sweep");
            }
            Ok(SweepAxis::MaxVelocity(parse_values(
                &options.values,
                "max velocity",
            )?))
        }
        SweepAxisArg::SlowProbability => {
            if options.range.is_some() {
                bail!("--range only applies to a vehicle-count sweep");
            }
            if options.values.is_empty() {
                bail!("--values must list at least one probability");
            }
            let probabilities = options
                .values
                .iter()
                .map(|value| value.trim().parse::<SlowdownProbability>())
                .collect::<Result<Vec<_>, _>>()?;
            Ok(SweepAxis::SlowProbability(probabilities))
        }
    }
}

/// Parse a comma-split value list into vehicle counts or velocities
fn parse_values(values: &[String], what: &str) -> Result<Vec<u32>> {
    if values.is_empty() {
        bail!("--values must list at least one {}", what);
    }
    values
        .iter()
        .map(|value| {
            value
                .trim()
                .parse::<u32>()
                .with_context(|| format!("invalid {} '{}'", what, value))
        })
        .collect()
}

/// Parse `start:end:step` with an exclusive end
fn parse_range(text: &str) -> Result<(u32, u32, u32)> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() != 3 {
        bail!("range must be start:end:step, got '{}'", text);
    }
    let mut numbers = [0u32; 3];
    for (number, part) in numbers.iter_mut().zip(&parts) {
        *number = part
            .trim()
            .parse::<u32>()
            .with_context(|| format!("invalid range component '{}'", part))?;
    }
    if numbers[2] == 0 {
        bail!("range step must be positive");
    }
    Ok((numbers[0], numbers[1], numbers[2]))
}

fn print_table(outcome: &SweepOutcome) {
    println!(
        "{:>12} {:>10} {:>10} {:>14}",
        "value", "density", "flow", "displacement"
    );
    for run in &outcome.runs {
        println!(
            "{:>12.4} {:>10.4} {:>10.4} {:>14}",
            run.value, run.density, run.flow, run.total_displacement
        );
    }
    for skip in &outcome.skipped {
        println!("{:>12.4} skipped: {}", skip.value, skip.reason);
    }
}

/// Fit a quintic to total displacement over the swept value and report
/// the location of its maximum
///
/// The fit runs on values mapped onto `[0, 1]`; raw vehicle counts in
/// the hundreds make quintic normal equations singular.
fn report_displacement_peak(outcome: &SweepOutcome) -> Result<()> {
    let (values, displacements) = outcome.displacement_series();
    let model = Polynomial::new(5);
    if values.len() < model.parameter_count() {
        bail!(
            "quintic fit needs at least {} completed runs, have {}",
            model.parameter_count(),
            values.len()
        );
    }

    let low = values.iter().copied().fold(f64::INFINITY, f64::min);
    let high = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = high - low;
    if span == 0.0 {
        bail!("swept values are all identical, nothing to fit");
    }

    let normalized: Vec<f64> = values.iter().map(|value| (value - low) / span).collect();
    let params = LeastSquaresFitter::default()
        .fit(&model, &normalized, &displacements)
        .context("quintic displacement fit failed")?;

    // Search in value units, starting from the best observed sample
    let best = displacements
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(index, _)| values[index])
        .unwrap_or(low);
    let objective = |value: f64| -model.eval((value - low) / span, &params);
    let peak = GoldenSectionMinimizer::default()
        .minimize(&objective, best)
        .context("displacement peak search failed")?;

    println!(
        "Quintic displacement fit: peak at value {:.2} (fitted displacement {:.1})",
        peak,
        model.eval((peak - low) / span, &params)
    );
    Ok(())
}

/// Fit straight lines to the two regimes of the flow-density diagram
fn report_two_regime(outcome: &SweepOutcome, max_velocity: u32) -> Result<()> {
    let points = outcome.flow_density_points();
    let (free_flow, congested) = split_by_regime(&points, max_velocity);
    println!(
        "Two-regime split at critical density {:.4}: {} free-flow, {} congested",
        1.0 / (f64::from(max_velocity) + 1.0),
        free_flow.len(),
        congested.len()
    );

    let fitter = LeastSquaresFitter::default();
    let line = Polynomial::new(1);
    for (label, side) in [("free-flow", &free_flow), ("congested", &congested)] {
        if side.len() < line.parameter_count() {
            println!("  {}: too few points to fit ({})", label, side.len());
            continue;
        }
        let (x, y): (Vec<f64>, Vec<f64>) =
            side.iter().map(|point| (point.density, point.flow)).unzip();
        let params = fitter
            .fit(&line, &x, &y)
            .with_context(|| format!("{} line fit failed", label))?;
        println!(
            "  {} ({} points): slope {:.4}, intercept {:.4}",
            label,
            side.len(),
            params[1],
            params[0]
        );
    }
    Ok(())
}

/// Write completed runs as JSON or CSV by extension
fn export(outcome: &SweepOutcome, path: &Path) -> Result<()> {
    let mut writer = create_output(path)?;
    if wants_json(path) {
        serde_json::to_writer_pretty(&mut writer, &outcome.runs)
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        writeln!(writer, "index,value,density,flow,total_displacement,seed")?;
        for run in &outcome.runs {
            writeln!(
                writer,
                "{},{},{},{},{},{}",
                run.index, run.value, run.density, run.flow, run.total_displacement, run.params.seed
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_returns_exclusive_triple() {
        assert_eq!(parse_range("55:505:5").unwrap(), (55, 505, 5));
        assert_eq!(parse_range(" 20 : 1020 : 20 ").unwrap(), (20, 1020, 20));
    }

    #[test]
    fn test_parse_range_rejects_malformed_input() {
        assert!(parse_range("55:505").is_err());
        assert!(parse_range("a:b:c").is_err());
        assert!(parse_range("10:100:0").is_err());
    }

    #[test]
    fn test_parse_values_trims_and_parses() {
        let values = vec!["1".to_string(), " 3".to_string(), "5 ".to_string()];
        assert_eq!(parse_values(&values, "max velocity").unwrap(), vec![1, 3, 5]);
    }

    #[test]
    fn test_parse_values_rejects_empty_and_garbage() {
        assert!(parse_values(&[], "vehicle count").is_err());
        assert!(parse_values(&["x".to_string()], "vehicle count").is_err());
    }

    #[test]
    fn test_probability_axis_parses_fraction_forms() {
        let options = SweepOptions {
            ring_size: 100,
            steps: 10,
            max_velocity: 5,
            vehicles: 30,
            slow_probability: SlowdownProbability::default(),
            seed: Some(1),
            axis: SweepAxisArg::SlowProbability,
            values: vec!["0".to_string(), "1/2".to_string(), "1/4".to_string()],
            range: None,
            fit: false,
            two_regime: false,
            output: None,
        };
        let axis = build_axis(&options).unwrap();
        assert_eq!(
            axis,
            SweepAxis::SlowProbability(vec![
                SlowdownProbability::never(),
                SlowdownProbability::one_in(2),
                SlowdownProbability::one_in(4),
            ])
        );
    }

    #[test]
    fn test_range_is_rejected_off_the_vehicle_axis() {
        let options = SweepOptions {
            ring_size: 100,
            steps: 10,
            max_velocity: 5,
            vehicles: 30,
            slow_probability: SlowdownProbability::default(),
            seed: Some(1),
            axis: SweepAxisArg::MaxVelocity,
            values: Vec::new(),
            range: Some("1:6:1".to_string()),
            fit: false,
            two_regime: false,
            output: None,
        };
        assert!(build_axis(&options).is_err());
    }
}
