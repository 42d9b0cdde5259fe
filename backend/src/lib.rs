//! Traffic Simulator Core - Rust Engine
//!
//! Deterministic Nagel–Schreckenberg simulation of one-lane circular
//! traffic, with parameter sweeps and flow–density analysis.
//!
//! # Architecture
//!
//! - **core**: Ring geometry and wraparound position arithmetic
//! - **models**: Domain types (Vehicle, RunTrace)
//! - **automaton**: The velocity/position update loop
//! - **rng**: Deterministic random number generation and seed entropy
//! - **sweep**: Repeated runs across one swept parameter
//! - **analysis**: Flow–density reductions and fitting collaborators
//!
//! # Critical Invariants
//!
//! 1. All randomness is deterministic (seeded xorshift64* streams)
//! 2. The velocity pass reads only start-of-step positions
//! 3. Recorded traces hold positions only; velocities stay internal

// Module declarations
pub mod analysis;
pub mod automaton;
pub mod core;
pub mod models;
pub mod rng;
pub mod sweep;

// Re-exports for convenience
pub use analysis::{
    density,
    fit::{
        CurveFitter, CurveModel, FitError, GoldenSectionMinimizer, LeastSquaresFitter, Minimizer,
        Polynomial,
    },
    flow, split_by_regime, FlowDensityPoint,
};
pub use automaton::{
    engine::{simulate, ParameterError, Simulation, SimulationParams, BURN_IN_STEPS},
    probability::{ParseProbabilityError, SlowdownProbability},
};
pub use crate::core::ring::Ring;
pub use models::{
    trace::{RunTrace, TraceError},
    vehicle::Vehicle,
};
pub use rng::{entropy_seed, EntropyError, RngManager};
pub use sweep::{
    SkipReason, SkippedRun, SweepAxis, SweepConfig, SweepDriver, SweepOutcome, SweepRun,
};
