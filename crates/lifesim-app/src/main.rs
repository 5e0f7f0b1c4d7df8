use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use lifesim_app::{
    SimulationDriver, ViewportEvent, apply_event, capture_frame, load_config, statistics_snapshot,
    write_json,
};
use lifesim_core::{SimulationConfig, SpawnMethod, World};
use lifesim_races::default_registry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "lifesim",
    version,
    about = "Run a headless lifesim arena between competing races"
)]
struct Cli {
    /// Comma-separated race names to enter (case-insensitive); all races by default.
    #[arg(long, value_delimiter = ',')]
    races: Vec<String>,

    /// Initial number of lifelets, split evenly between races.
    #[arg(long)]
    population: Option<usize>,

    /// How the initial population is placed.
    #[arg(long, value_enum)]
    spawn: Option<SpawnArg>,

    /// Ticks to simulate; runs until extinction when omitted.
    #[arg(long)]
    ticks: Option<u64>,

    /// Ticks per second; 0 runs as fast as possible.
    #[arg(long)]
    tick_rate: Option<u32>,

    /// Seed for the world's random source.
    #[arg(long, env = "LIFESIM_SEED")]
    seed: Option<u64>,

    /// JSON configuration file; flags override its values.
    #[arg(long, env = "LIFESIM_CONFIG")]
    config: Option<PathBuf>,

    /// Log a progress summary every N ticks (0 disables).
    #[arg(long, default_value_t = 100)]
    report_every: u64,

    /// World point whose lifelet is selected before the frame is exported, as `X,Y`.
    #[arg(long, value_delimiter = ',', num_args = 2, value_names = ["X", "Y"])]
    focus: Option<Vec<f64>>,

    /// Write the final frame's draw commands here as JSON.
    #[arg(long)]
    frame_out: Option<PathBuf>,

    /// Write the final statistics here as JSON.
    #[arg(long)]
    stats_out: Option<PathBuf>,

    /// Write the run summary here as JSON.
    #[arg(long)]
    summary_out: Option<PathBuf>,

    /// Draw the debug overlay in exported frames.
    #[arg(long)]
    debug: bool,

    /// Print the available races and exit.
    #[arg(long)]
    list_races: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SpawnArg {
    Grouped,
    Ring,
    Scattered,
}

impl From<SpawnArg> for SpawnMethod {
    fn from(value: SpawnArg) -> Self {
        match value {
            SpawnArg::Grouped => Self::GroupedOnRing,
            SpawnArg::Ring => Self::RandomOnRing,
            SpawnArg::Scattered => Self::Scattered,
        }
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    if cli.list_races {
        let registry = default_registry();
        for (race, name) in registry.iter() {
            println!("{name}\t{}", registry.author(race).unwrap_or_default());
        }
        return Ok(());
    }

    let config = build_config(&cli)?;
    let world = build_world(&cli, config)?;
    let mut driver = SimulationDriver::new(world).with_report_every(cli.report_every);

    if let Some([x, y]) = cli.focus.as_deref() {
        apply_event(driver.world_mut(), ViewportEvent::CursorMoved { x: *x, y: *y })?;
    }
    let summary = driver.run(cli.ticks).context("simulation failed")?;
    if cli.focus.is_some() {
        apply_event(driver.world_mut(), ViewportEvent::Click)?;
    }

    info!(
        ticks = summary.ticks_simulated,
        final_tick = summary.final_tick,
        lifelets = summary.final_lifelets,
        deaths = summary.deaths,
        extinct = summary.extinct,
        "run complete",
    );
    for entry in &summary.population {
        info!(race = %entry.race, lifelets = entry.lifelets, "final population");
    }

    let world = driver.world();
    if let Some(path) = &cli.frame_out {
        write_json(path, capture_frame(world).commands())?;
    }
    if let Some(path) = &cli.stats_out {
        write_json(path, &statistics_snapshot(world))?;
    }
    if let Some(path) = &cli.summary_out {
        write_json(path, &summary)?;
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn build_config(cli: &Cli) -> Result<SimulationConfig> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(population) = cli.population {
        config.initial_lifelets = population;
    }
    if let Some(spawn) = cli.spawn {
        config.spawn_method = spawn.into();
    }
    if let Some(rate) = cli.tick_rate {
        config.tick_rate_hz = rate;
    }
    if cli.seed.is_some() {
        config.rng_seed = cli.seed;
    }
    config.debug |= cli.debug;
    Ok(config)
}

fn build_world(cli: &Cli, config: SimulationConfig) -> Result<World> {
    let mut registry = default_registry();
    if !cli.races.is_empty() {
        for wanted in &cli.races {
            if registry.find(wanted).is_none() {
                bail!("unknown race '{wanted}' (try --list-races)");
            }
        }
        registry = registry.retain(|name| {
            cli.races
                .iter()
                .any(|wanted| wanted.eq_ignore_ascii_case(name))
        });
    }
    World::new(config, registry).context("failed to create world")
}
