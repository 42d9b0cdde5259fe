//! Parameter sweeps across repeated runs
//!
//! A sweep repeats the automaton over a sequence of values for one
//! parameter (vehicle count, max velocity, or slowdown probability),
//! derives an independent seed per run, and reduces each recorded trace
//! to its macroscopic quantities: density, flow, total displacement.
//!
//! Runs are independent, so execution parallelizes across them when the
//! `parallel` feature is on. Results are ordered by axis position in
//! both modes and are identical either way.
//!
//! Invalid combinations mid-sweep (say, a vehicle count exceeding the
//! ring) are recorded as skipped and the sweep continues. A cancellation
//! flag checked before each run turns the not-yet-started remainder into
//! skips as well; a run already underway always finishes.

use std::sync::atomic::{AtomicBool, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::analysis::{self, FlowDensityPoint};
use crate::automaton::engine::{ParameterError, Simulation, SimulationParams};
use crate::automaton::probability::SlowdownProbability;
use crate::rng::RngManager;

// ============================================================================
// Configuration
// ============================================================================

/// The parameter a sweep varies, with the values it takes in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepAxis {
    /// Vary the number of vehicles on the ring
    VehicleCount(Vec<u32>),
    /// Vary the speed limit parameter
    MaxVelocity(Vec<u32>),
    /// Vary the spontaneous slowdown probability
    SlowProbability(Vec<SlowdownProbability>),
}

impl SweepAxis {
    /// Vehicle counts from `start` up to but excluding `end`, by `step`
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::sweep::SweepAxis;
    ///
    /// let axis = SweepAxis::vehicle_count_range(55, 70, 5);
    /// assert_eq!(axis, SweepAxis::VehicleCount(vec![55, 60, 65]));
    /// ```
    pub fn vehicle_count_range(start: u32, end: u32, step: u32) -> Self {
        assert!(step > 0, "step must be positive");
        Self::VehicleCount((start..end).step_by(step as usize).collect())
    }

    /// Number of runs the axis describes
    pub fn len(&self) -> usize {
        match self {
            Self::VehicleCount(values) => values.len(),
            Self::MaxVelocity(values) => values.len(),
            Self::SlowProbability(values) => values.len(),
        }
    }

    /// True when the axis holds no values
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The swept scalar at `index`, for reporting and plot axes
    fn value_at(&self, index: usize) -> f64 {
        match self {
            Self::VehicleCount(values) => f64::from(values[index]),
            Self::MaxVelocity(values) => f64::from(values[index]),
            Self::SlowProbability(values) => values[index].as_f64(),
        }
    }

    /// Parameters for run `index`: the base set with the swept field and
    /// the derived seed substituted
    fn params_at(&self, base: &SimulationParams, index: usize, seed: u64) -> SimulationParams {
        let mut params = base.clone();
        params.seed = seed;
        match self {
            Self::VehicleCount(values) => params.vehicle_count = values[index],
            Self::MaxVelocity(values) => params.max_velocity = values[index],
            Self::SlowProbability(values) => params.slow_probability = values[index],
        }
        params
    }
}

/// Complete sweep configuration
///
/// `base` supplies every parameter the axis does not vary. `base.seed`
/// seeds the child-seed stream, never any run directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Parameters shared by every run
    pub base: SimulationParams,
    /// The varied parameter and its values
    pub axis: SweepAxis,
}

// ============================================================================
// Outcome types
// ============================================================================

/// Macroscopic outcome of one completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRun {
    /// Position of the run along the axis
    pub index: usize,
    /// The swept value as a plottable scalar
    pub value: f64,
    /// Exact parameters of the run, derived seed included
    pub params: SimulationParams,
    /// Vehicles per cell
    pub density: f64,
    /// Total displacement normalized by ring size and recorded steps
    pub flow: f64,
    /// Cells travelled by all vehicles over the recorded steps
    pub total_displacement: u64,
}

/// Why a run produced no record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// Parameter validation rejected the combination
    #[error(transparent)]
    Invalid(#[from] ParameterError),

    /// The cancellation flag was set before the run started
    #[error("cancelled before the run started")]
    Cancelled,
}

/// A run the sweep did not complete
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRun {
    /// Position of the run along the axis
    pub index: usize,
    /// The swept value at that position
    pub value: f64,
    /// What prevented the run
    pub reason: SkipReason,
}

/// Everything a sweep produced
///
/// Completed and skipped runs are each ordered by axis position; the
/// `index` fields refer back to the axis.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepOutcome {
    /// Completed runs in axis order
    pub runs: Vec<SweepRun>,
    /// Runs that validation or cancellation kept from completing
    pub skipped: Vec<SkippedRun>,
}

impl SweepOutcome {
    /// One fundamental-diagram point per completed run, in axis order
    pub fn flow_density_points(&self) -> Vec<FlowDensityPoint> {
        self.runs
            .iter()
            .map(|run| FlowDensityPoint {
                density: run.density,
                flow: run.flow,
            })
            .collect()
    }

    /// Swept values and total displacements as plottable series
    pub fn displacement_series(&self) -> (Vec<f64>, Vec<f64>) {
        self.runs
            .iter()
            .map(|run| (run.value, run.total_displacement as f64))
            .unzip()
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Executes a configured sweep
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::sweep::{SweepAxis, SweepConfig, SweepDriver};
/// use traffic_simulator_core_rs::SimulationParams;
///
/// let config = SweepConfig {
///     base: SimulationParams::new(100, 50, 5, 1, 42),
///     axis: SweepAxis::vehicle_count_range(10, 40, 10),
/// };
/// let outcome = SweepDriver::new(config).run();
/// assert_eq!(outcome.runs.len(), 3);
/// assert!(outcome.skipped.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct SweepDriver {
    config: SweepConfig,
}

impl SweepDriver {
    /// Create a driver for the given configuration
    pub fn new(config: SweepConfig) -> Self {
        Self { config }
    }

    /// Run the whole sweep to completion
    pub fn run(&self) -> SweepOutcome {
        self.run_with_cancel(&AtomicBool::new(false))
    }

    /// Run the sweep, checking `cancel` before starting each run
    ///
    /// Cancellation is coarse: a run already underway finishes, and every
    /// run not yet started is skipped with [`SkipReason::Cancelled`].
    pub fn run_with_cancel(&self, cancel: &AtomicBool) -> SweepOutcome {
        let seeds = self.derive_seeds();
        debug!(
            "starting sweep: {} runs over {}",
            seeds.len(),
            match &self.config.axis {
                SweepAxis::VehicleCount(_) => "vehicle count",
                SweepAxis::MaxVelocity(_) => "max velocity",
                SweepAxis::SlowProbability(_) => "slowdown probability",
            }
        );

        let results = self.execute(&seeds, cancel);

        let mut outcome = SweepOutcome::default();
        for (index, result) in results {
            match result {
                Ok(run) => outcome.runs.push(run),
                Err(reason) => outcome.skipped.push(SkippedRun {
                    index,
                    value: self.config.axis.value_at(index),
                    reason,
                }),
            }
        }
        outcome
    }

    /// Derive one child seed per axis position from the base seed
    ///
    /// The child stream is itself xorshift64*, so distinct positions get
    /// distinct seeds and the whole sweep is reproducible from
    /// `base.seed` alone.
    fn derive_seeds(&self) -> Vec<u64> {
        let mut rng = RngManager::new(self.config.base.seed);
        (0..self.config.axis.len()).map(|_| rng.next()).collect()
    }

    /// Execute every run (parallel version)
    #[cfg(feature = "parallel")]
    fn execute(
        &self,
        seeds: &[u64],
        cancel: &AtomicBool,
    ) -> Vec<(usize, Result<SweepRun, SkipReason>)> {
        seeds
            .par_iter()
            .enumerate()
            .map(|(index, &seed)| (index, self.run_one(index, seed, cancel)))
            .collect()
    }

    /// Execute every run (serial version when the parallel feature is off)
    #[cfg(not(feature = "parallel"))]
    fn execute(
        &self,
        seeds: &[u64],
        cancel: &AtomicBool,
    ) -> Vec<(usize, Result<SweepRun, SkipReason>)> {
        seeds
            .iter()
            .enumerate()
            .map(|(index, &seed)| (index, self.run_one(index, seed, cancel)))
            .collect()
    }

    fn run_one(
        &self,
        index: usize,
        seed: u64,
        cancel: &AtomicBool,
    ) -> Result<SweepRun, SkipReason> {
        if cancel.load(Ordering::SeqCst) {
            return Err(SkipReason::Cancelled);
        }

        let value = self.config.axis.value_at(index);
        let params = self.config.axis.params_at(&self.config.base, index, seed);
        let simulation = Simulation::new(params.clone()).map_err(|err| {
            warn!("skipping sweep run at value {}: {}", value, err);
            SkipReason::from(err)
        })?;

        let trace = simulation.run();
        let total_displacement = trace.total_displacement();
        let density = analysis::density(params.vehicle_count, params.ring_size);
        let flow = analysis::flow(total_displacement, params.ring_size, params.steps);
        debug!(
            "sweep run at value {} complete: density {:.4}, flow {:.4}",
            value, density, flow
        );

        Ok(SweepRun {
            index,
            value,
            params,
            density,
            flow,
            total_displacement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "step must be positive")]
    fn test_zero_step_range_panics() {
        SweepAxis::vehicle_count_range(10, 100, 0);
    }

    #[test]
    fn test_range_excludes_end() {
        let axis = SweepAxis::vehicle_count_range(20, 100, 20);
        assert_eq!(axis, SweepAxis::VehicleCount(vec![20, 40, 60, 80]));
    }

    #[test]
    fn test_params_at_overrides_swept_field_and_seed() {
        let base = SimulationParams::new(100, 50, 5, 30, 9);
        let axis = SweepAxis::MaxVelocity(vec![1, 3, 5]);
        let params = axis.params_at(&base, 1, 777);
        assert_eq!(params.max_velocity, 3);
        assert_eq!(params.seed, 777);
        assert_eq!(params.vehicle_count, 30);
    }

    #[test]
    fn test_probability_axis_reports_float_value() {
        let axis = SweepAxis::SlowProbability(vec![
            SlowdownProbability::never(),
            SlowdownProbability::one_in(4),
        ]);
        assert_eq!(axis.value_at(0), 0.0);
        assert_eq!(axis.value_at(1), 0.25);
    }
}
