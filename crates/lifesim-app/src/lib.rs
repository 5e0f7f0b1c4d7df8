//! Shared application plumbing for running lifesim worlds outside a window.

pub mod driver;
pub mod export;
pub mod input;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use lifesim_core::SimulationConfig;

pub use driver::{RacePopulation, RunSummary, SimulationDriver};
pub use export::{capture_frame, statistics_snapshot, write_json};
pub use input::{ViewportEvent, apply_event};

/// Read a (possibly partial) JSON configuration; missing fields keep their defaults.
pub fn load_config(path: &Path) -> Result<SimulationConfig> {
    let file = File::open(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;
    let config: SimulationConfig = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(config)
}
