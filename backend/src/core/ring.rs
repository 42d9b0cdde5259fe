//! Circular road geometry
//!
//! The road is a closed ring of cells indexed `0..size`. Position
//! arithmetic wraps at the boundary, so a "forward distance" is always
//! non-negative and the cell after `size - 1` is `0`.

use serde::{Deserialize, Serialize};

/// Geometry of a one-lane circular road
///
/// All positions are cell indices in `[0, size)`. The ring only does
/// arithmetic; it holds no vehicle state.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::Ring;
///
/// let ring = Ring::new(10);
/// assert_eq!(ring.advance(8, 3), 1);
/// assert_eq!(ring.distance(8, 1), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ring {
    /// Number of cells on the ring
    size: u32,
}

impl Ring {
    /// Create a ring with the given number of cells
    ///
    /// # Arguments
    /// * `size` - Number of cells (must be positive)
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::Ring;
    ///
    /// let ring = Ring::new(100);
    /// assert_eq!(ring.size(), 100);
    /// ```
    pub fn new(size: u32) -> Self {
        assert!(size > 0, "ring size must be positive");
        Self { size }
    }

    /// Number of cells on the ring
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Forward distance from `from` to `to`, wrapping at the boundary
    ///
    /// Returns 0 when the positions coincide.
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::Ring;
    ///
    /// let ring = Ring::new(10);
    /// assert_eq!(ring.distance(2, 7), 5);
    /// assert_eq!(ring.distance(7, 2), 5); // wraps through cell 0
    /// assert_eq!(ring.distance(4, 4), 0);
    /// ```
    pub fn distance(&self, from: u32, to: u32) -> u32 {
        debug_assert!(from < self.size && to < self.size);
        let size = u64::from(self.size);
        ((u64::from(to) + size - u64::from(from)) % size) as u32
    }

    /// Move a position `by` cells forward, wrapping at the boundary
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::Ring;
    ///
    /// let ring = Ring::new(10);
    /// assert_eq!(ring.advance(9, 1), 0);
    /// assert_eq!(ring.advance(3, 0), 3);
    /// ```
    pub fn advance(&self, position: u32, by: u32) -> u32 {
        debug_assert!(position < self.size);
        ((u64::from(position) + u64::from(by)) % u64::from(self.size)) as u32
    }

    /// Evenly subdivide the ring into `count` starting positions
    ///
    /// Position `i` is `round(i * size / count)`, computed in integer
    /// arithmetic. For `count <= size` the positions are strictly
    /// increasing, so every position is a distinct cell; `count == size`
    /// fills the ring completely.
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::Ring;
    ///
    /// let ring = Ring::new(10);
    /// assert_eq!(ring.evenly_spaced(2), vec![0, 5]);
    /// assert_eq!(ring.evenly_spaced(1), vec![0]);
    /// assert_eq!(ring.evenly_spaced(4), vec![0, 3, 5, 8]);
    /// ```
    pub fn evenly_spaced(&self, count: u32) -> Vec<u32> {
        let size = u64::from(self.size);
        let count = u64::from(count);
        (0..count)
            .map(|i| ((2 * i * size + count) / (2 * count)) as u32)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[should_panic(expected = "ring size must be positive")]
    fn test_zero_size_panics() {
        Ring::new(0);
    }

    #[test]
    fn test_distance_is_inverse_of_advance() {
        let ring = Ring::new(17);
        for from in 0..17 {
            for by in 0..17 {
                let to = ring.advance(from, by);
                assert_eq!(ring.distance(from, to), by);
            }
        }
    }

    #[test]
    fn test_evenly_spaced_fills_ring_completely() {
        let ring = Ring::new(7);
        assert_eq!(ring.evenly_spaced(7), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_evenly_spaced_strictly_increasing() {
        for size in 1..40u32 {
            let ring = Ring::new(size);
            for count in 1..=size {
                let positions = ring.evenly_spaced(count);
                assert_eq!(positions.len(), count as usize);
                assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
                assert!(positions.iter().all(|&p| p < size));
            }
        }
    }
}
