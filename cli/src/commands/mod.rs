//! CLI commands
//!
//! Implementation of the run and sweep commands plus the helpers they
//! share.

pub mod run;
pub mod sweep;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use traffic_simulator_core_rs::entropy_seed;

/// Use the supplied seed, or draw one from OS entropy
///
/// The drawn seed is logged so an entropy-seeded run stays reproducible.
pub fn resolve_seed(seed: Option<u64>) -> Result<u64> {
    match seed {
        Some(seed) => Ok(seed),
        None => {
            let seed = entropy_seed().context("failed to read OS entropy for a seed")?;
            info!("drew seed {} from OS entropy", seed);
            Ok(seed)
        }
    }
}

/// True when the path asks for JSON output
pub fn wants_json(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"))
}

/// Open a buffered writer, creating or truncating the file
pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(BufWriter::new(file))
}
