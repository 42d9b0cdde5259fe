//! Core geometry for the simulation

pub mod ring;

// Re-exports
pub use ring::Ring;
