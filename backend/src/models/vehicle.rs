//! Per-vehicle state

use serde::{Deserialize, Serialize};

/// Snapshot of a single vehicle: its cell and its current speed
///
/// Vehicles are identified by their index in the simulation's vehicle
/// order. On a single lane that order never changes.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::Vehicle;
///
/// let vehicle = Vehicle::new(3, 0);
/// assert_eq!(vehicle.position(), 3);
/// assert_eq!(vehicle.velocity(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Cell index on the ring
    position: u32,
    /// Cells travelled per step
    velocity: u32,
}

impl Vehicle {
    /// Create a vehicle snapshot
    pub fn new(position: u32, velocity: u32) -> Self {
        Self { position, velocity }
    }

    /// Cell index on the ring
    pub fn position(&self) -> u32 {
        self.position
    }

    /// Cells travelled per step
    pub fn velocity(&self) -> u32 {
        self.velocity
    }
}
