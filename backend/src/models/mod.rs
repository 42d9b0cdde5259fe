//! Domain models for the traffic simulator

pub mod trace;
pub mod vehicle;

// Re-exports
pub use trace::{RunTrace, TraceError};
pub use vehicle::Vehicle;
