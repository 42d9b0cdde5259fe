//! Randomized slowdown parameterization
//!
//! The automaton's only stochastic ingredient is the per-vehicle,
//! per-step chance of a spontaneous slowdown. It is kept as an exact
//! rational so that the classic one-in-three draw stays an integer
//! comparison instead of becoming a float threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::automaton::engine::ParameterError;
use crate::rng::RngManager;

/// A probability string that is not `N/D` or `0`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid probability '{0}': expected a rational like 1/3, or 0")]
pub struct ParseProbabilityError(String);

/// Probability that a vehicle spontaneously slows down in a given step
///
/// Expressed as an exact rational `numerator / denominator` with
/// `numerator <= denominator` and a nonzero denominator. The default is
/// the classic 1-in-3 slowdown.
///
/// # Example
/// ```
/// use traffic_simulator_core_rs::SlowdownProbability;
///
/// let quarter = SlowdownProbability::new(1, 4).unwrap();
/// assert_eq!(quarter.as_f64(), 0.25);
/// assert_eq!(SlowdownProbability::default(), SlowdownProbability::one_in(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlowdownProbability {
    /// Trigger outcomes within the draw space
    numerator: u32,
    /// Size of the draw space
    denominator: u32,
}

impl SlowdownProbability {
    /// Create a probability of `numerator / denominator`
    ///
    /// # Arguments
    /// * `numerator` - Trigger outcomes, at most `denominator`
    /// * `denominator` - Draw space size, at least 1
    ///
    /// # Returns
    /// * `Ok(SlowdownProbability)` - A rational in `[0, 1]`
    /// * `Err(ParameterError::InvalidProbability)` - Otherwise
    pub fn new(numerator: u32, denominator: u32) -> Result<Self, ParameterError> {
        if denominator == 0 || numerator > denominator {
            return Err(ParameterError::InvalidProbability {
                numerator,
                denominator,
            });
        }
        Ok(Self {
            numerator,
            denominator,
        })
    }

    /// Probability 0: vehicles never slow down spontaneously
    pub fn never() -> Self {
        Self {
            numerator: 0,
            denominator: 1,
        }
    }

    /// Probability `1 / chances`, the "one chance in `chances`" convention
    ///
    /// `chances == 0` is accepted as shorthand for [`never`](Self::never),
    /// matching sweep configurations that use 0 to switch the slowdown
    /// off entirely.
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::SlowdownProbability;
    ///
    /// assert_eq!(SlowdownProbability::one_in(4).as_f64(), 0.25);
    /// assert_eq!(SlowdownProbability::one_in(0), SlowdownProbability::never());
    /// ```
    pub fn one_in(chances: u32) -> Self {
        if chances == 0 {
            Self::never()
        } else {
            Self {
                numerator: 1,
                denominator: chances,
            }
        }
    }

    /// Trigger outcomes within the draw space
    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    /// Size of the draw space
    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    /// The probability as a float, for reporting and plot axes
    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }

    /// Draw once and report whether the slowdown triggers
    ///
    /// Always consumes exactly one draw from `rng`, whatever the
    /// probability, so the stream position after a step never depends on
    /// the configured value.
    pub fn sample(&self, rng: &mut RngManager) -> bool {
        rng.range(0, i64::from(self.denominator)) < i64::from(self.numerator)
    }
}

impl Default for SlowdownProbability {
    /// The classic one-in-three slowdown
    fn default() -> Self {
        Self {
            numerator: 1,
            denominator: 3,
        }
    }
}

impl fmt::Display for SlowdownProbability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for SlowdownProbability {
    type Err = ParseProbabilityError;

    /// Parse `"N/D"` rationals and the bare `"0"` shorthand for never
    ///
    /// # Example
    /// ```
    /// use traffic_simulator_core_rs::SlowdownProbability;
    ///
    /// let p: SlowdownProbability = "1/3".parse().unwrap();
    /// assert_eq!(p, SlowdownProbability::default());
    /// assert_eq!("0".parse::<SlowdownProbability>().unwrap(), SlowdownProbability::never());
    /// assert!("half".parse::<SlowdownProbability>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text == "0" {
            return Ok(Self::never());
        }
        let invalid = || ParseProbabilityError(s.to_string());
        let (numerator, denominator) = text.split_once('/').ok_or_else(invalid)?;
        let numerator: u32 = numerator.trim().parse().map_err(|_| invalid())?;
        let denominator: u32 = denominator.trim().parse().map_err(|_| invalid())?;
        Self::new(numerator, denominator).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_zero_denominator() {
        assert_eq!(
            SlowdownProbability::new(1, 0),
            Err(ParameterError::InvalidProbability {
                numerator: 1,
                denominator: 0,
            })
        );
    }

    #[test]
    fn test_rejects_probability_above_one() {
        assert!(SlowdownProbability::new(4, 3).is_err());
    }

    #[test]
    fn test_never_never_triggers() {
        let mut rng = RngManager::new(7);
        let never = SlowdownProbability::never();
        assert!((0..1000).all(|_| !never.sample(&mut rng)));
    }

    #[test]
    fn test_certain_always_triggers() {
        let mut rng = RngManager::new(7);
        let certain = SlowdownProbability::new(1, 1).unwrap();
        assert!((0..1000).all(|_| certain.sample(&mut rng)));
    }

    #[test]
    fn test_sample_consumes_one_draw_regardless_of_probability() {
        // Two streams with the same seed must stay aligned even though
        // one samples a zero probability and the other a certain one.
        let mut lhs = RngManager::new(42);
        let mut rhs = RngManager::new(42);
        let never = SlowdownProbability::never();
        let certain = SlowdownProbability::new(1, 1).unwrap();

        for _ in 0..100 {
            never.sample(&mut lhs);
            certain.sample(&mut rhs);
        }
        assert_eq!(lhs.next(), rhs.next());
    }

    #[test]
    fn test_one_in_three_hits_about_a_third() {
        let mut rng = RngManager::new(12345);
        let p = SlowdownProbability::default();
        let hits = (0..30_000).filter(|_| p.sample(&mut rng)).count();
        // Loose band around the 10,000 expectation
        assert!((9_000..11_000).contains(&hits), "got {} hits", hits);
    }

    #[test]
    fn test_display_round_trips_through_from_str() {
        let p = SlowdownProbability::new(2, 5).unwrap();
        assert_eq!(p.to_string().parse::<SlowdownProbability>().unwrap(), p);
    }
}
