//! Macroscopic flow–density analysis
//!
//! Reduces raw sweep output to the quantities of the fundamental diagram
//! of traffic flow, and partitions diagram points into the free-flow and
//! congested regimes. Curve fitting lives in [`fit`] behind collaborator
//! traits.

pub mod fit;

// Re-exports
pub use fit::{
    CurveFitter, CurveModel, FitError, GoldenSectionMinimizer, LeastSquaresFitter, Minimizer,
    Polynomial,
};

use serde::{Deserialize, Serialize};

/// Vehicles per cell
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::analysis::density;
///
/// assert_eq!(density(30, 100), 0.3);
/// ```
pub fn density(vehicle_count: u32, ring_size: u32) -> f64 {
    f64::from(vehicle_count) / f64::from(ring_size)
}

/// Cells travelled per cell per recorded step
///
/// Normalizes a run's total displacement by ring size times recorded
/// steps.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::analysis::flow;
///
/// assert_eq!(flow(500, 100, 10), 0.5);
/// ```
pub fn flow(total_displacement: u64, ring_size: u32, steps: usize) -> f64 {
    total_displacement as f64 / (f64::from(ring_size) * steps as f64)
}

/// One point of the fundamental diagram
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowDensityPoint {
    /// Vehicles per cell
    pub density: f64,
    /// Cells travelled per cell per step
    pub flow: f64,
}

/// Split diagram points at the critical density `1 / (max_velocity + 1)`
///
/// Points at or below the critical density land on the free-flow side,
/// the rest on the congested side. Order is preserved within each side.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::analysis::{split_by_regime, FlowDensityPoint};
///
/// let points = vec![
///     FlowDensityPoint { density: 0.10, flow: 0.09 },
///     FlowDensityPoint { density: 0.25, flow: 0.20 },
///     FlowDensityPoint { density: 0.60, flow: 0.12 },
/// ];
/// let (free_flow, congested) = split_by_regime(&points, 3);
/// assert_eq!(free_flow.len(), 2); // critical density 1/4
/// assert_eq!(congested.len(), 1);
/// ```
pub fn split_by_regime(
    points: &[FlowDensityPoint],
    max_velocity: u32,
) -> (Vec<FlowDensityPoint>, Vec<FlowDensityPoint>) {
    let critical = 1.0 / (f64::from(max_velocity) + 1.0);
    points
        .iter()
        .copied()
        .partition(|point| point.density <= critical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_point_counts_as_free_flow() {
        let points = vec![FlowDensityPoint {
            density: 0.25,
            flow: 0.2,
        }];
        let (free_flow, congested) = split_by_regime(&points, 3);
        assert_eq!(free_flow.len(), 1);
        assert!(congested.is_empty());
    }

    #[test]
    fn test_split_preserves_order() {
        let points: Vec<FlowDensityPoint> = (1..=8)
            .map(|i| FlowDensityPoint {
                density: i as f64 / 8.0,
                flow: 0.0,
            })
            .collect();
        let (free_flow, congested) = split_by_regime(&points, 3);
        assert!(free_flow.windows(2).all(|p| p[0].density < p[1].density));
        assert!(congested.windows(2).all(|p| p[0].density < p[1].density));
    }
}
