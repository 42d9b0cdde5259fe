//! Seed generation from operating-system entropy
//!
//! When the caller supplies no seed, one is drawn here. Seeds are three
//! bytes wide and the caller is expected to report the value, so any run
//! seeded this way can still be reproduced exactly.

use thiserror::Error;

/// Failure to read entropy from the operating system
#[derive(Debug, Error)]
#[error("failed to read entropy from the operating system: {0}")]
pub struct EntropyError(getrandom::Error);

/// Draw a fresh seed from OS entropy
///
/// Reads 3 bytes and interprets them big-endian, so seeds lie in
/// `[0, 2^24)`. A zero read is passed through unchanged; the RNG maps it
/// to a valid state on construction.
///
/// # Example
/// ```no_run
/// use traffic_simulator_core_rs::rng::entropy_seed;
///
/// let seed = entropy_seed().unwrap();
/// assert!(seed < 1 << 24);
/// ```
pub fn entropy_seed() -> Result<u64, EntropyError> {
    let mut bytes = [0u8; 3];
    getrandom::getrandom(&mut bytes).map_err(EntropyError)?;
    Ok((u64::from(bytes[0]) << 16) | (u64::from(bytes[1]) << 8) | u64::from(bytes[2]))
}
