//! Deterministic random number generation
//!
//! Uses xorshift64* for fast, deterministic draws. All randomness in the
//! simulator goes through this module; seeds come either from the caller
//! or from `entropy_seed`.

mod entropy;
mod xorshift;

pub use entropy::{entropy_seed, EntropyError};
pub use xorshift::RngManager;
