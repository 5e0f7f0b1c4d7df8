//! JSON exports of a world's last frame and statistics.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use lifesim_core::{RecordingSurface, StatValue, Tick, World};
use serde::Serialize;

/// Serialize `value` as pretty JSON at `path`, creating parent directories.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .with_context(|| format!("failed to serialize JSON into {}", path.display()))?;
    Ok(())
}

/// Draw the world once onto a recording surface.
#[must_use]
pub fn capture_frame(world: &World) -> RecordingSurface {
    let mut surface = RecordingSurface::new();
    world.draw(&mut surface);
    surface
}

/// Statistics map plus the tick it was taken at.
#[derive(Debug, Clone, Serialize)]
pub struct StatisticsSnapshot<'a> {
    pub tick: Tick,
    pub total_deaths: u64,
    pub statistics: &'a BTreeMap<String, StatValue>,
}

#[must_use]
pub fn statistics_snapshot(world: &World) -> StatisticsSnapshot<'_> {
    StatisticsSnapshot {
        tick: world.tick(),
        total_deaths: world.total_deaths(),
        statistics: world.statistics(),
    }
}
