//! Nagel–Schreckenberg automaton
//!
//! `engine` holds the update loop; `probability` parameterizes the
//! spontaneous slowdown.

pub mod engine;
pub mod probability;

// Re-export main types for convenience
pub use engine::{simulate, ParameterError, Simulation, SimulationParams, BURN_IN_STEPS};
pub use probability::{ParseProbabilityError, SlowdownProbability};
