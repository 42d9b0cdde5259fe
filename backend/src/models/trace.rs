//! Recorded simulation output
//!
//! A run produces a dense table of vehicle positions: one row per
//! recorded step, one column per vehicle. The table is the complete
//! observable output of a run; velocities are internal to the engine and
//! never recorded.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ring::Ring;

/// Errors raised when assembling a trace from externally supplied rows
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraceError {
    /// A trace records at least one step
    #[error("trace must contain at least one row")]
    Empty,

    /// A trace records at least one vehicle
    #[error("trace rows must contain at least one position")]
    NoVehicles,

    /// A row's width differs from the first row's
    #[error("row {row} has {got} positions, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    /// A position does not fit on the ring
    #[error("position {position} in row {row} is outside a ring of {ring_size} cells")]
    PositionOutOfRange {
        row: usize,
        position: u32,
        ring_size: u32,
    },
}

/// Dense record of vehicle positions over the recorded steps of a run
///
/// Row `t`, column `i` holds the cell of vehicle `i` after recorded step
/// `t`. Rows are stored flat in row-major order; every row has
/// `vehicle_count` columns and `vehicle_count` is at least 1.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::RunTrace;
///
/// let trace = RunTrace::from_rows(10, &[vec![0, 5], vec![1, 6], vec![3, 8]]).unwrap();
/// assert_eq!(trace.steps(), 3);
/// assert_eq!(trace.vehicle_count(), 2);
/// assert_eq!(trace.total_displacement(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunTrace {
    /// Number of cells on the ring the positions refer to
    ring_size: u32,
    /// Number of columns per row
    vehicle_count: u32,
    /// Row-major position table
    positions: Vec<u32>,
}

impl RunTrace {
    /// Create an empty trace and reserve space for `steps` rows
    pub(crate) fn with_capacity(ring_size: u32, vehicle_count: u32, steps: usize) -> Self {
        Self {
            ring_size,
            vehicle_count,
            positions: Vec::with_capacity(steps * vehicle_count as usize),
        }
    }

    /// Append one row of positions
    pub(crate) fn push_row(&mut self, row: &[u32]) {
        debug_assert_eq!(row.len(), self.vehicle_count as usize);
        self.positions.extend_from_slice(row);
    }

    /// Build a trace from explicit rows, validating shape and bounds
    ///
    /// Every row must have the same, nonzero width, and every position
    /// must lie on the ring.
    ///
    /// # Arguments
    /// * `ring_size` - Number of cells the positions refer to
    /// * `rows` - One position row per recorded step
    ///
    /// # Returns
    /// * `Ok(RunTrace)` - All rows consistent
    /// * `Err(TraceError)` - First violated constraint
    pub fn from_rows(ring_size: u32, rows: &[Vec<u32>]) -> Result<Self, TraceError> {
        let first = rows.first().ok_or(TraceError::Empty)?;
        if first.is_empty() {
            return Err(TraceError::NoVehicles);
        }
        let expected = first.len();

        let mut trace = Self::with_capacity(ring_size, expected as u32, rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.len() != expected {
                return Err(TraceError::RaggedRow {
                    row: index,
                    expected,
                    got: row.len(),
                });
            }
            if let Some(&position) = row.iter().find(|&&p| p >= ring_size) {
                return Err(TraceError::PositionOutOfRange {
                    row: index,
                    position,
                    ring_size,
                });
            }
            trace.push_row(row);
        }
        Ok(trace)
    }

    /// Number of cells on the ring the positions refer to
    pub fn ring_size(&self) -> u32 {
        self.ring_size
    }

    /// Number of vehicles (columns per row)
    pub fn vehicle_count(&self) -> usize {
        self.vehicle_count as usize
    }

    /// Number of recorded steps (rows)
    pub fn steps(&self) -> usize {
        self.positions.len() / self.vehicle_count as usize
    }

    /// Positions after recorded step `step`, in vehicle order
    ///
    /// # Panics
    /// Panics if `step >= steps()`.
    pub fn row(&self, step: usize) -> &[u32] {
        let width = self.vehicle_count as usize;
        &self.positions[step * width..(step + 1) * width]
    }

    /// Iterate over rows in recording order
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::RunTrace;
    ///
    /// let trace = RunTrace::from_rows(5, &[vec![0], vec![2]]).unwrap();
    /// let rows: Vec<&[u32]> = trace.rows().collect();
    /// assert_eq!(rows, vec![&[0][..], &[2][..]]);
    /// ```
    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.positions.chunks_exact(self.vehicle_count as usize)
    }

    /// Total cells travelled by each vehicle across the recorded steps
    ///
    /// Sums the wrapped displacement between consecutive rows, so a
    /// vehicle crossing the ring boundary still contributes its true
    /// travel. A single-row trace has no transitions and yields zeros.
    pub fn displacement_per_vehicle(&self) -> Vec<u64> {
        let ring = Ring::new(self.ring_size);
        let mut totals = vec![0u64; self.vehicle_count as usize];

        let mut rows = self.rows();
        let mut previous = match rows.next() {
            Some(row) => row,
            None => return totals,
        };
        for row in rows {
            for (total, (&from, &to)) in totals.iter_mut().zip(previous.iter().zip(row)) {
                *total += u64::from(ring.distance(from, to));
            }
            previous = row;
        }
        totals
    }

    /// Total cells travelled by all vehicles across the recorded steps
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::RunTrace;
    ///
    /// // One vehicle advancing 2 cells per step on a ring of 5
    /// let trace = RunTrace::from_rows(5, &[vec![0], vec![2], vec![4], vec![1]]).unwrap();
    /// assert_eq!(trace.total_displacement(), 6);
    /// ```
    pub fn total_displacement(&self) -> u64 {
        self.displacement_per_vehicle().iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_rejects_empty() {
        assert_eq!(RunTrace::from_rows(10, &[]), Err(TraceError::Empty));
    }

    #[test]
    fn test_from_rows_rejects_zero_width() {
        assert_eq!(
            RunTrace::from_rows(10, &[vec![]]),
            Err(TraceError::NoVehicles)
        );
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let rows = vec![vec![0, 5], vec![1]];
        assert_eq!(
            RunTrace::from_rows(10, &rows),
            Err(TraceError::RaggedRow {
                row: 1,
                expected: 2,
                got: 1,
            })
        );
    }

    #[test]
    fn test_from_rows_rejects_out_of_range_position() {
        let rows = vec![vec![0, 5], vec![1, 10]];
        assert_eq!(
            RunTrace::from_rows(10, &rows),
            Err(TraceError::PositionOutOfRange {
                row: 1,
                position: 10,
                ring_size: 10,
            })
        );
    }

    #[test]
    fn test_single_row_trace_has_zero_displacement() {
        let trace = RunTrace::from_rows(10, &[vec![0, 5]]).unwrap();
        assert_eq!(trace.displacement_per_vehicle(), vec![0, 0]);
        assert_eq!(trace.total_displacement(), 0);
    }
}
