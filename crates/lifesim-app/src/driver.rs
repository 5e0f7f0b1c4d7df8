use std::thread;
use std::time::{Duration, Instant};

use lifesim_core::{TickReport, World, WorldError};
use serde::Serialize;
use tracing::{error, info};

/// Default number of ticks between progress summaries.
pub const DEFAULT_REPORT_EVERY: u64 = 100;

/// Runs a world tick after tick, optionally throttled to a fixed rate.
///
/// Ticks never overlap: the next tick starts only after the previous
/// `simulate` call has returned, and any slack is slept away afterwards.
pub struct SimulationDriver {
    world: World,
    tick_interval: Option<Duration>,
    report_every: u64,
}

/// Lifelets alive at the end of a run for one race.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RacePopulation {
    pub race: String,
    pub lifelets: usize,
}

/// Aggregate outcome of [`SimulationDriver::run`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub ticks_simulated: u64,
    pub final_tick: u64,
    pub initial_lifelets: usize,
    pub final_lifelets: usize,
    pub deaths: usize,
    pub food_eaten: usize,
    pub messages_sent: usize,
    pub attacks: usize,
    pub energy_given: f64,
    pub extinct: bool,
    pub population: Vec<RacePopulation>,
}

impl RunSummary {
    fn record(&mut self, report: &TickReport) {
        self.ticks_simulated += 1;
        self.final_tick = report.tick.0;
        self.final_lifelets = report.lifelets;
        self.deaths += report.deaths;
        self.food_eaten += report.food_eaten;
        self.messages_sent += report.messages_sent;
        self.attacks += report.attacks;
        self.energy_given += report.energy_given;
    }
}

impl SimulationDriver {
    /// Wraps `world`, pacing ticks at the world's configured `tick_rate_hz`.
    #[must_use]
    pub fn new(world: World) -> Self {
        let rate = world.config().tick_rate_hz;
        Self {
            world,
            tick_interval: (rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(rate))),
            report_every: DEFAULT_REPORT_EVERY,
        }
    }

    /// Log a progress summary every `ticks` ticks; 0 disables summaries.
    #[must_use]
    pub fn with_report_every(mut self, ticks: u64) -> Self {
        self.report_every = ticks;
        self
    }

    #[must_use]
    pub fn tick_interval(&self) -> Option<Duration> {
        self.tick_interval
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn into_world(self) -> World {
        self.world
    }

    /// Advance the world by `ticks` ticks, or until every lifelet is dead
    /// when `ticks` is `None`. The first failing tick ends the run.
    pub fn run(&mut self, ticks: Option<u64>) -> Result<RunSummary, WorldError> {
        let mut summary = RunSummary {
            initial_lifelets: self.world.lifelets().len(),
            final_tick: self.world.tick().0,
            final_lifelets: self.world.lifelets().len(),
            ..RunSummary::default()
        };

        while ticks.is_none_or(|limit| summary.ticks_simulated < limit) {
            if self.world.lifelets().is_empty() {
                break;
            }
            let started = Instant::now();
            let report = self.world.simulate().inspect_err(|err| {
                error!(tick = self.world.tick().0, error = %err, "simulation halted");
            })?;
            summary.record(&report);
            if self.report_every > 0 && report.tick.0.is_multiple_of(self.report_every) {
                info!(
                    tick = report.tick.0,
                    lifelets = report.lifelets,
                    food = report.food,
                    messages = report.messages,
                    deaths = summary.deaths,
                    population = ?report.population,
                    "simulation progress",
                );
            }
            if let Some(interval) = self.tick_interval {
                let elapsed = started.elapsed();
                if elapsed < interval {
                    thread::sleep(interval - elapsed);
                }
            }
        }

        summary.extinct = self.world.lifelets().is_empty();
        summary.population = self
            .world
            .races()
            .iter()
            .zip(self.world.population())
            .map(|((_, race), lifelets)| RacePopulation {
                race: race.to_owned(),
                lifelets,
            })
            .collect();
        Ok(summary)
    }
}
