//! Nagel–Schreckenberg automaton engine
//!
//! One simulation owns a ring, a vehicle population, and a deterministic
//! RNG stream. Each step applies the classic two-pass update:
//!
//! ```text
//! For each step:
//! 1. Velocity pass, per vehicle (positions frozen):
//!    a. accelerate:      if v + 1 < V_max { v += 1 }
//!    b. keep distance:   if v >= gap      { v = gap - 1 }   (floor at 0)
//!    c. random slowdown: with probability p { v -= 1 }      (floor at 0)
//! 2. Position pass: every vehicle moves v cells forward, wrapping.
//! ```
//!
//! The velocity pass reads only start-of-step positions, so the update is
//! synchronous: vehicle order never affects the outcome within a step.
//! Note the strict acceleration test: the attainable top speed is
//! `V_max - 1`, not `V_max`.
//!
//! A run consists of [`BURN_IN_STEPS`] unrecorded warm-up steps followed
//! by the requested number of recorded steps; the trace holds positions
//! only.
//!
//! # Example
//!
//! ```
//! use traffic_simulator_core_rs::automaton::{Simulation, SimulationParams};
//!
//! let params = SimulationParams::new(100, 50, 5, 30, 42);
//! let trace = Simulation::new(params).unwrap().run();
//! assert_eq!(trace.steps(), 50);
//! assert_eq!(trace.vehicle_count(), 30);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::automaton::probability::SlowdownProbability;
use crate::core::ring::Ring;
use crate::models::trace::RunTrace;
use crate::models::vehicle::Vehicle;
use crate::rng::RngManager;

/// Number of unrecorded warm-up steps before recording begins
pub const BURN_IN_STEPS: usize = 100;

// ============================================================================
// Configuration
// ============================================================================

/// Complete parameter set for a single run
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::{SimulationParams, SlowdownProbability};
///
/// let params = SimulationParams::new(100, 1000, 5, 30, 42)
///     .with_slow_probability(SlowdownProbability::never());
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationParams {
    /// Number of cells on the circular road
    pub ring_size: u32,

    /// Number of recorded steps (burn-in comes on top of these)
    pub steps: usize,

    /// Speed limit parameter; the acceleration rule raises velocity only
    /// while `velocity + 1 < max_velocity`, so the attainable top speed
    /// is `max_velocity - 1`
    pub max_velocity: u32,

    /// Number of vehicles placed on the ring
    pub vehicle_count: u32,

    /// Per-vehicle, per-step probability of a spontaneous slowdown
    pub slow_probability: SlowdownProbability,

    /// Seed for the deterministic RNG stream
    pub seed: u64,
}

impl SimulationParams {
    /// Create a parameter set with the default 1-in-3 slowdown
    ///
    /// # Arguments
    /// * `ring_size` - Number of cells on the circular road
    /// * `steps` - Number of recorded steps
    /// * `max_velocity` - Speed limit parameter (top speed is one below)
    /// * `vehicle_count` - Number of vehicles
    /// * `seed` - RNG seed
    pub fn new(
        ring_size: u32,
        steps: usize,
        max_velocity: u32,
        vehicle_count: u32,
        seed: u64,
    ) -> Self {
        Self {
            ring_size,
            steps,
            max_velocity,
            vehicle_count,
            slow_probability: SlowdownProbability::default(),
            seed,
        }
    }

    /// Replace the slowdown probability
    pub fn with_slow_probability(mut self, slow_probability: SlowdownProbability) -> Self {
        self.slow_probability = slow_probability;
        self
    }

    /// Validate the parameter set
    ///
    /// # Returns
    /// * `Ok(())` - Parameters describe a runnable simulation
    /// * `Err(ParameterError)` - First violated constraint
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.ring_size == 0 {
            return Err(ParameterError::EmptyRing);
        }
        if self.steps == 0 {
            return Err(ParameterError::NoSteps);
        }
        if self.max_velocity == 0 {
            return Err(ParameterError::ZeroMaxVelocity);
        }
        if self.vehicle_count == 0 {
            return Err(ParameterError::NoVehicles);
        }
        if self.vehicle_count > self.ring_size {
            return Err(ParameterError::TooManyVehicles {
                vehicle_count: self.vehicle_count,
                ring_size: self.ring_size,
            });
        }
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Rejected parameter combinations
///
/// Validation runs before any state is allocated; a simulation is never
/// half-built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// The ring must contain at least one cell
    #[error("ring size must be at least 1")]
    EmptyRing,

    /// At least one step must be recorded
    #[error("recorded step count must be at least 1")]
    NoSteps,

    /// The speed limit parameter must be at least 1
    #[error("max velocity must be at least 1")]
    ZeroMaxVelocity,

    /// At least one vehicle must be placed
    #[error("vehicle count must be at least 1")]
    NoVehicles,

    /// The ring cannot hold more vehicles than cells
    #[error("vehicle count {vehicle_count} exceeds ring size {ring_size}")]
    TooManyVehicles { vehicle_count: u32, ring_size: u32 },

    /// Slowdown probability outside `[0, 1]` or with a zero denominator
    #[error("slowdown probability {numerator}/{denominator} is not a rational in [0, 1]")]
    InvalidProbability { numerator: u32, denominator: u32 },
}

// ============================================================================
// Simulation
// ============================================================================

/// A single in-progress run
///
/// Owns the full mutable state: per-vehicle positions and velocities in
/// vehicle order, the ring geometry, and the RNG stream. Construction
/// validates parameters and places the vehicles; [`run`](Self::run)
/// consumes the simulation and yields the recorded trace.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::{Simulation, SimulationParams};
///
/// let sim = Simulation::new(SimulationParams::new(10, 5, 3, 2, 7)).unwrap();
/// assert_eq!(sim.positions(), &[0, 5]);
/// ```
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Road geometry
    ring: Ring,
    /// Cell of each vehicle, in vehicle order
    positions: Vec<u32>,
    /// Speed of each vehicle, in vehicle order
    velocities: Vec<u32>,
    /// Steps to record after burn-in
    steps: usize,
    /// Speed limit parameter (top speed is one below)
    max_velocity: u32,
    /// Spontaneous slowdown probability
    slow_probability: SlowdownProbability,
    /// Deterministic draw stream
    rng: RngManager,
}

impl Simulation {
    /// Validate parameters and build the initial state
    ///
    /// Vehicles start stationary, evenly spaced over the ring: vehicle
    /// `i` sits at `round(i * ring_size / vehicle_count)`.
    ///
    /// # Arguments
    /// * `params` - Complete parameter set
    ///
    /// # Returns
    /// * `Ok(Simulation)` - Ready to step
    /// * `Err(ParameterError)` - First violated parameter constraint
    pub fn new(params: SimulationParams) -> Result<Self, ParameterError> {
        params.validate()?;

        let ring = Ring::new(params.ring_size);
        let positions = ring.evenly_spaced(params.vehicle_count);
        let velocities = vec![0; positions.len()];

        Ok(Self {
            ring,
            positions,
            velocities,
            steps: params.steps,
            max_velocity: params.max_velocity,
            slow_probability: params.slow_probability,
            rng: RngManager::new(params.seed),
        })
    }

    /// Advance the automaton by one step
    ///
    /// The velocity pass reads only the positions all vehicles held when
    /// the step began; positions change in the second pass.
    pub fn step(&mut self) {
        let count = self.positions.len();
        for i in 0..count {
            // Free road all the way around when alone; otherwise the gap
            // to the next vehicle in ring order.
            let gap = if count == 1 {
                self.ring.size()
            } else {
                self.ring
                    .distance(self.positions[i], self.positions[(i + 1) % count])
            };

            let mut velocity = self.velocities[i];
            if velocity + 1 < self.max_velocity {
                velocity += 1;
            }
            if velocity >= gap {
                velocity = gap.saturating_sub(1);
            }
            if self.slow_probability.sample(&mut self.rng) {
                velocity = velocity.saturating_sub(1);
            }
            self.velocities[i] = velocity;
        }

        let ring = self.ring;
        for (position, &velocity) in self.positions.iter_mut().zip(&self.velocities) {
            *position = ring.advance(*position, velocity);
        }
    }

    /// Run burn-in plus the recorded steps, consuming the simulation
    ///
    /// Exactly [`BURN_IN_STEPS`] warm-up steps run first and leave no
    /// record; each of the following `steps` steps appends one row to the
    /// trace. The final velocity vector is discarded with the simulation;
    /// positions are the only observable output.
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::{Simulation, SimulationParams};
    ///
    /// let trace = Simulation::new(SimulationParams::new(50, 20, 3, 10, 1))
    ///     .unwrap()
    ///     .run();
    /// assert_eq!(trace.steps(), 20);
    /// ```
    pub fn run(mut self) -> RunTrace {
        debug!(
            "starting run: {} cells, {} vehicles, {} recorded steps",
            self.ring.size(),
            self.positions.len(),
            self.steps
        );

        for _ in 0..BURN_IN_STEPS {
            self.step();
        }

        let mut trace =
            RunTrace::with_capacity(self.ring.size(), self.positions.len() as u32, self.steps);
        for _ in 0..self.steps {
            self.step();
            trace.push_row(&self.positions);
        }
        trace
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Current cell of every vehicle, in vehicle order
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    /// Current speed of every vehicle, in vehicle order
    pub fn velocities(&self) -> &[u32] {
        &self.velocities
    }

    /// Snapshot of every vehicle, in vehicle order
    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.positions
            .iter()
            .zip(&self.velocities)
            .map(|(&position, &velocity)| Vehicle::new(position, velocity))
            .collect()
    }
}

// ============================================================================
// Convenience entry point
// ============================================================================

/// Run a complete simulation with the default 1-in-3 slowdown
///
/// Equivalent to building [`SimulationParams`], constructing a
/// [`Simulation`], and calling [`run`](Simulation::run).
///
/// # Arguments
/// * `ring_size` - Number of cells on the circular road
/// * `steps` - Number of recorded steps
/// * `max_velocity` - Speed limit parameter (top speed is one below)
/// * `vehicle_count` - Number of vehicles
/// * `seed` - RNG seed
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::simulate;
///
/// let trace = simulate(100, 10, 5, 30, 42).unwrap();
/// assert_eq!(trace.steps(), 10);
/// assert_eq!(trace.vehicle_count(), 30);
/// ```
pub fn simulate(
    ring_size: u32,
    steps: usize,
    max_velocity: u32,
    vehicle_count: u32,
    seed: u64,
) -> Result<RunTrace, ParameterError> {
    let params = SimulationParams::new(ring_size, steps, max_velocity, vehicle_count, seed);
    Ok(Simulation::new(params)?.run())
}
