//! World state and the per-tick simulation pipeline.

use crate::Tick;
use crate::config::{SimulationConfig, SpawnMethod};
use crate::context::LifeletContext;
use crate::draw::{Color, Surface, TextAnchor};
use crate::entity::{Entity, EntityId, Food, Lifecycle, Message};
use crate::error::WorldError;
use crate::lifelet::{Lifelet, LifeletId, SimulationPhase};
use crate::loop_list::LoopList;
use crate::math::{Vector, dispersed, jittered, random_in_disc, random_on_ring};
use crate::race::{RaceId, RaceRegistry};
use crate::shell::{LifeletLookup, Shell, TickClock};
use rand::Rng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Value stored in the world statistics map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatValue {
    Color(Color),
    Count(u64),
    Value(f64),
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(c) => write!(f, "rgb({}, {}, {})", c.r, c.g, c.b),
            Self::Count(n) => write!(f, "{n}"),
            Self::Value(v) => write!(f, "{v:.3}"),
        }
    }
}

/// Counters accumulated while a tick runs.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct TickCounters {
    pub deaths: usize,
    pub food_eaten: usize,
    pub messages_sent: usize,
    pub attacks: usize,
    pub energy_given: f64,
}

/// Summary of one simulated tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    pub lifelets: usize,
    pub food: usize,
    pub messages: usize,
    pub deaths: usize,
    pub food_eaten: usize,
    pub food_expired: usize,
    pub food_respawned: usize,
    pub messages_sent: usize,
    pub attacks: usize,
    pub energy_given: f64,
    /// Living lifelets per race, indexed by `RaceId`.
    pub population: Vec<usize>,
}

/// Aggregate simulation state: races, entity collections, statistics and clock.
pub struct World {
    pub(crate) config: SimulationConfig,
    races: RaceRegistry,
    race_names: Vec<Arc<str>>,
    race_colors: Vec<Color>,
    pub(crate) lifelets: LoopList<Lifelet>,
    pub(crate) food: LoopList<Food>,
    pub(crate) messages: LoopList<Message>,
    statistics: BTreeMap<String, StatValue>,
    tick: Tick,
    clock: TickClock,
    pub(crate) rng: SmallRng,
    next_lifelet: u64,
    next_entity: u64,
    cursor: Option<Vector>,
    highlighted: Option<LifeletId>,
    selected: Option<LifeletId>,
    total_deaths: u64,
    pub(crate) counters: TickCounters,
    history: VecDeque<TickReport>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("tick", &self.tick)
            .field("races", &self.race_names)
            .field("lifelets", &self.lifelets.len())
            .field("food", &self.food.len())
            .field("messages", &self.messages.len())
            .finish()
    }
}

impl LifeletLookup for World {
    fn lookup(&self, id: LifeletId) -> Option<&Lifelet> {
        self.lifelets.find(id)
    }

    fn settings(&self) -> &SimulationConfig {
        &self.config
    }
}

impl World {
    /// Build a world from a configuration and the competing races, spawning
    /// the initial population and food.
    pub fn new(config: SimulationConfig, races: RaceRegistry) -> Result<Self, WorldError> {
        config.validate()?;
        if races.is_empty() {
            return Err(WorldError::NoRaces);
        }
        let mut rng = config.seeded_rng();
        let race_names: Vec<Arc<str>> = races.iter().map(|(_, name)| Arc::from(name)).collect();
        let race_colors = assign_colors(&mut rng, races.len());

        let mut world = Self {
            config,
            races,
            race_names,
            race_colors,
            lifelets: LoopList::new(),
            food: LoopList::new(),
            messages: LoopList::new(),
            statistics: BTreeMap::new(),
            tick: Tick::zero(),
            clock: TickClock::new(),
            rng,
            next_lifelet: 0,
            next_entity: 0,
            cursor: None,
            highlighted: None,
            selected: None,
            total_deaths: 0,
            counters: TickCounters::default(),
            history: VecDeque::new(),
        };
        world.spawn()?;
        info!(
            races = world.race_names.len(),
            lifelets = world.lifelets.len(),
            food = world.food.len(),
            spawn = ?world.config.spawn_method,
            "world created"
        );
        Ok(world)
    }

    /// Drop every entity and spawn a fresh population. Identifiers keep increasing.
    pub fn reset(&mut self) -> Result<(), WorldError> {
        self.lifelets.clear();
        self.food.clear();
        self.messages.clear();
        self.history.clear();
        self.highlighted = None;
        self.selected = None;
        self.total_deaths = 0;
        self.spawn()?;
        info!(tick = self.tick.0, lifelets = self.lifelets.len(), "world reset");
        Ok(())
    }

    /// Advance the world by one tick.
    ///
    /// Food ages first, then messages, then every lifelet in collection order
    /// runs its behaviour followed by the vitals update. A behaviour error stops
    /// the tick and is returned with the offending lifelet attached.
    pub fn simulate(&mut self) -> Result<TickReport, WorldError> {
        self.highlighted = None;
        self.counters = TickCounters::default();
        self.tick = self.tick.next();
        self.clock.set(self.tick);

        let food_expired = self.stage_food();
        self.stage_messages();
        if let Err(err) = self.stage_lifelets() {
            error!(tick = self.tick.0, error = %err, "tick failed");
            return Err(err);
        }
        let food_respawned = self.stage_respawn();

        let report = self.build_report(food_expired, food_respawned);
        self.refresh_statistics();
        if self.history.len() >= self.config.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(report.clone());
        Ok(report)
    }

    fn stage_food(&mut self) -> usize {
        let mut expired = 0;
        self.food.traverse(|food, staging| {
            if food.simulate() == Lifecycle::Expired {
                staging.remove(food.id());
                expired += 1;
            }
        });
        expired
    }

    fn stage_messages(&mut self) {
        self.messages.traverse(|message, staging| {
            if message.simulate() == Lifecycle::Expired {
                staging.remove(message.id());
            }
        });
    }

    fn stage_lifelets(&mut self) -> Result<(), WorldError> {
        let count = self.lifelets.begin_traversal();
        let mut result = Ok(());
        for index in 0..count {
            result = self.simulate_lifelet(index);
            if result.is_err() {
                break;
            }
        }
        self.lifelets.end_traversal();
        result
    }

    fn simulate_lifelet(&mut self, index: usize) -> Result<(), WorldError> {
        let Some(lifelet) = self.lifelets.get_mut(index) else {
            return Ok(());
        };
        if !lifelet.is_alive() {
            return Ok(());
        }
        lifelet.prepare();
        let (id, race) = (lifelet.id(), lifelet.race());
        let mut behavior = lifelet.take_behavior();

        let decided = match behavior.as_mut() {
            Some(behavior) => behavior.decide(&mut LifeletContext::new(self, index)),
            None => Ok(()),
        };
        if let Some(lifelet) = self.lifelets.get_mut(index) {
            lifelet.restore_behavior(behavior);
        }
        decided.map_err(|source| WorldError::Behavior {
            lifelet: id,
            race: self.race_name(race).to_owned(),
            source,
        })?;

        self.apply_vitals(index);
        self.verify_simulated(index)?;

        if let (Some(cursor), Some(lifelet)) = (self.cursor, self.lifelets.get(index))
            && lifelet.distance(cursor) < self.config.mouse_sensitivity
        {
            self.highlighted = Some(id);
        }
        Ok(())
    }

    /// The fixed per-tick update every living lifelet receives after deciding.
    fn apply_vitals(&mut self, index: usize) {
        let Some(lifelet) = self.lifelets.as_mut_slice().get_mut(index) else {
            return;
        };
        if !lifelet.is_alive() {
            return;
        }
        lifelet.metabolize(&self.config);
        let position = lifelet.position();

        let radius = self.config.food_pickup_radius;
        let reachable: Vec<EntityId> = self
            .food
            .iter()
            .filter(|food| food.distance(position) < radius)
            .map(Entity::id)
            .collect();
        let mut gained = 0.0;
        for id in reachable {
            if let Some(food) = self.food.find(id) {
                gained += food.energy();
            }
            if self.food.remove(id) {
                self.counters.food_eaten += 1;
            }
        }

        let lifelet = &mut self.lifelets.as_mut_slice()[index];
        lifelet.receive_energy(gained);
        let outcome = lifelet.resolve_motion(&self.config);
        if outcome.died {
            self.kill(index);
        }
    }

    fn verify_simulated(&self, index: usize) -> Result<(), WorldError> {
        match self.lifelets.get(index) {
            Some(lifelet) if lifelet.phase() != SimulationPhase::Simulated => {
                Err(WorldError::ProtocolViolation {
                    lifelet: lifelet.id(),
                    race: lifelet.race(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Kill the lifelet at `index`: it stops acting immediately, leaves the
    /// collection once the traversal ends and drops its energy as food.
    pub(crate) fn kill(&mut self, index: usize) {
        let Some(lifelet) = self.lifelets.get_mut(index) else {
            return;
        };
        if !lifelet.is_alive() {
            return;
        }
        lifelet.mark_dead();
        let (id, race, position, energy) = (
            lifelet.id(),
            lifelet.race(),
            lifelet.position(),
            lifelet.energy(),
        );
        self.lifelets.remove(id);
        self.spawn_food_with_energy(position, energy);
        self.counters.deaths += 1;
        self.total_deaths += 1;
        if self.selected == Some(id) {
            self.selected = None;
        }
        debug!(lifelet = %id, race = self.race_name(race), energy, "lifelet died");
    }

    fn stage_respawn(&mut self) -> usize {
        let interval = self.config.food_respawn_interval;
        if interval == 0 || !self.tick.0.is_multiple_of(interval) {
            return 0;
        }
        let amount = self.config.food_respawn_amount;
        for _ in 0..amount {
            let position = random_in_disc(&mut self.rng, self.config.world_radius);
            self.spawn_food(position);
        }
        debug!(tick = self.tick.0, amount, "food respawned");
        amount
    }

    fn build_report(&self, food_expired: usize, food_respawned: usize) -> TickReport {
        let counters = self.counters;
        TickReport {
            tick: self.tick,
            lifelets: self.lifelets.len(),
            food: self.food.len(),
            messages: self.messages.len(),
            deaths: counters.deaths,
            food_eaten: counters.food_eaten,
            food_expired,
            food_respawned,
            messages_sent: counters.messages_sent,
            attacks: counters.attacks,
            energy_given: counters.energy_given,
            population: self.population(),
        }
    }

    /// Living lifelets per race, indexed by `RaceId`.
    #[must_use]
    pub fn population(&self) -> Vec<usize> {
        let mut counts = vec![0; self.race_names.len()];
        for lifelet in self.lifelets.iter().filter(|l| l.is_alive()) {
            if let Some(count) = counts.get_mut(lifelet.race().0) {
                *count += 1;
            }
        }
        counts
    }

    fn refresh_statistics(&mut self) {
        let population = self.population();
        let mut energy = vec![0.0; self.race_names.len()];
        for lifelet in self.lifelets.iter().filter(|l| l.is_alive()) {
            if let Some(total) = energy.get_mut(lifelet.race().0) {
                *total += lifelet.energy();
            }
        }
        for (index, name) in self.race_names.iter().enumerate() {
            self.statistics.insert(
                format!("{name}_color"),
                StatValue::Color(self.race_colors[index]),
            );
            self.statistics.insert(
                format!("{name}_population"),
                StatValue::Count(population[index] as u64),
            );
            let average = if population[index] > 0 {
                energy[index] / population[index] as f64
            } else {
                0.0
            };
            self.statistics
                .insert(format!("{name}_energy"), StatValue::Value(average));
        }
        self.statistics
            .insert("age".into(), StatValue::Count(self.tick.0));
        self.statistics
            .insert("lifelets".into(), StatValue::Count(self.lifelets.len() as u64));
        self.statistics
            .insert("food".into(), StatValue::Count(self.food.len() as u64));
        self.statistics
            .insert("messages".into(), StatValue::Count(self.messages.len() as u64));
        self.statistics
            .insert("deaths".into(), StatValue::Count(self.total_deaths));
    }

    fn spawn(&mut self) -> Result<(), WorldError> {
        let placements = self.spawn_positions();
        for (race, position) in placements {
            let id = self.next_lifelet_id();
            let behavior = self.races.spawn(&mut self.rng, race);
            let color = self.race_color(race);
            let lifelet = Lifelet::new(id, race, position, color, &self.config, behavior);
            self.lifelets.add(lifelet);
        }
        for _ in 0..self.config.initial_food {
            let position = random_in_disc(&mut self.rng, self.config.world_radius);
            self.spawn_food(position);
        }

        let count = self.lifelets.begin_traversal();
        let mut result = Ok(());
        for index in 0..count {
            result = self.spawn_hook(index);
            if result.is_err() {
                break;
            }
        }
        self.lifelets.end_traversal();
        result?;

        self.refresh_statistics();
        Ok(())
    }

    fn spawn_hook(&mut self, index: usize) -> Result<(), WorldError> {
        let Some(lifelet) = self.lifelets.get_mut(index) else {
            return Ok(());
        };
        let (id, race) = (lifelet.id(), lifelet.race());
        let mut behavior = lifelet.take_behavior();
        let spawned = match behavior.as_mut() {
            Some(behavior) => behavior.on_spawn(&mut LifeletContext::new(self, index)),
            None => Ok(()),
        };
        if let Some(lifelet) = self.lifelets.get_mut(index) {
            lifelet.restore_behavior(behavior);
        }
        spawned.map_err(|source| WorldError::Behavior {
            lifelet: id,
            race: self.race_name(race).to_owned(),
            source,
        })
    }

    /// Starting positions for the initial population, grouped by race.
    fn spawn_positions(&mut self) -> Vec<(RaceId, Vector)> {
        let race_count = self.race_names.len();
        let per_race = self.config.initial_lifelets / race_count;
        let remainder = self.config.initial_lifelets % race_count;
        let ring = self.config.initial_spawn_radius;
        let limit = self.config.world_radius;
        let spread = (self.config.dispersion_amount / self.config.dispersion_ratio).min(limit);

        let mut placements = Vec::with_capacity(self.config.initial_lifelets);
        for race_index in 0..race_count {
            let members = per_race + usize::from(race_index < remainder);
            let slot = Vector::from_angle(ring, TAU * race_index as f64 / race_count as f64);
            for _ in 0..members {
                let position = match self.config.spawn_method {
                    SpawnMethod::GroupedOnRing => {
                        let dx = dispersed(&mut self.rng, spread);
                        let dy = dispersed(&mut self.rng, spread);
                        slot + Vector::new(dx, dy)
                    }
                    SpawnMethod::RandomOnRing => random_on_ring(&mut self.rng, ring),
                    SpawnMethod::Scattered => random_in_disc(&mut self.rng, ring),
                };
                placements.push((RaceId(race_index), position.clamp_norm(limit)));
            }
        }
        placements
    }

    /// Drop a food item carrying `energy` at `position`.
    pub fn place_food(&mut self, position: Vector, energy: f64) -> EntityId {
        self.spawn_food_with_energy(position, energy.max(0.0))
    }

    fn spawn_food(&mut self, position: Vector) {
        let jitter = i64::from(self.config.food_energy_jitter);
        let offset = jittered(&mut self.rng, 0, jitter) as f64;
        let energy = (self.config.food_energy + offset).max(0.0);
        self.spawn_food_with_energy(position, energy);
    }

    fn spawn_food_with_energy(&mut self, position: Vector, energy: f64) -> EntityId {
        let max_age = jittered(
            &mut self.rng,
            self.config.food_max_age as i64,
            self.config.food_max_age_jitter as i64,
        )
        .max(0) as u64;
        let id = self.next_entity_id();
        self.food.add(Food::new(id, position, energy, max_age));
        id
    }

    fn next_lifelet_id(&mut self) -> LifeletId {
        let id = LifeletId(self.next_lifelet);
        self.next_lifelet += 1;
        id
    }

    pub(crate) fn next_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        id
    }

    pub(crate) fn capture_shell(&self, lifelet: &Lifelet) -> Shell {
        let name = self
            .race_names
            .get(lifelet.race().0)
            .cloned()
            .unwrap_or_else(|| Arc::from(UNKNOWN_RACE));
        Shell::capture(lifelet, name, &self.clock)
    }

    /// Shell of a living lifelet, valid until the next tick.
    #[must_use]
    pub fn shell_of(&self, id: LifeletId) -> Option<Shell> {
        self.lifelets
            .find(id)
            .filter(|lifelet| lifelet.is_alive())
            .map(|lifelet| self.capture_shell(lifelet))
    }

    /// Resolve a shell back to the live lifelet it describes.
    #[must_use]
    pub fn unshell(&self, shell: &Shell) -> Option<&Lifelet> {
        self.lifelets
            .find(shell.target())
            .filter(|lifelet| lifelet.is_alive())
    }

    #[must_use]
    pub fn lifelet(&self, id: LifeletId) -> Option<&Lifelet> {
        self.lifelets.find(id)
    }

    #[must_use]
    pub fn lifelets(&self) -> &LoopList<Lifelet> {
        &self.lifelets
    }

    #[must_use]
    pub fn food(&self) -> &LoopList<Food> {
        &self.food
    }

    #[must_use]
    pub fn messages(&self) -> &LoopList<Message> {
        &self.messages
    }

    #[must_use]
    pub fn races(&self) -> &RaceRegistry {
        &self.races
    }

    #[must_use]
    pub fn race_name(&self, race: RaceId) -> &str {
        self.race_names
            .get(race.0)
            .map_or(UNKNOWN_RACE, |name| name.as_ref())
    }

    #[must_use]
    pub fn race_color(&self, race: RaceId) -> Color {
        self.race_colors.get(race.0).copied().unwrap_or(Color::GRAY)
    }

    /// Current simulation tick.
    #[must_use]
    pub const fn tick(&self) -> Tick {
        self.tick
    }

    /// Returns an immutable reference to configuration.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Toggle the debug overlay.
    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    /// The world's seeded random source.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    #[must_use]
    pub fn statistics(&self) -> &BTreeMap<String, StatValue> {
        &self.statistics
    }

    /// Retained tick reports, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &TickReport> {
        self.history.iter()
    }

    #[must_use]
    pub fn total_deaths(&self) -> u64 {
        self.total_deaths
    }

    /// Last known cursor position in world coordinates.
    pub fn set_cursor(&mut self, x: f64, y: f64) {
        self.cursor = Some(Vector::new(x, y));
    }

    #[must_use]
    pub fn cursor(&self) -> Option<Vector> {
        self.cursor
    }

    /// Lifelet under the cursor during the last tick.
    #[must_use]
    pub fn highlighted_lifelet(&self) -> Option<LifeletId> {
        self.highlighted
    }

    pub fn set_highlighted_lifelet(&mut self, id: Option<LifeletId>) {
        self.highlighted = id;
    }

    #[must_use]
    pub fn selected_lifelet(&self) -> Option<LifeletId> {
        self.selected
    }

    pub fn select_lifelet(&mut self, id: Option<LifeletId>) {
        self.selected = id;
    }

    /// Viewport click: select the highlighted lifelet, otherwise drop the selection.
    pub fn toggle_selection(&mut self) {
        self.selected = self.highlighted;
    }

    /// Render the world onto `surface`.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let focus = self.selected.or(self.highlighted);
        let debug = self.config.debug;

        surface.clear(Color::BLACK);
        for food in &self.food {
            food.draw(surface);
        }
        for lifelet in self.lifelets.iter().filter(|l| l.is_alive()) {
            lifelet.draw(surface);
            let focused = focus == Some(lifelet.id());
            if focused || debug {
                self.draw_overlay(surface, lifelet, focused);
            }
        }
        for message in &self.messages {
            message.draw(surface);
        }

        let mut info = String::new();
        if let Some(lifelet) = focus.and_then(|id| self.lifelet(id)) {
            let race = lifelet.race();
            info.push_str(&format!("Race: {}\n", self.race_name(race)));
            if let Some(author) = self.races.author(race) {
                info.push_str(&format!("Author: {author}\n"));
            }
            for (key, value) in lifelet.describe(&self.config) {
                info.push_str(&format!("{key}: {value}\n"));
            }
            info.push('\n');
        }
        if debug {
            if let Some(cursor) = self.cursor {
                info.push_str(&format!("Cursor: {cursor}\n"));
            }
            for (key, value) in &self.statistics {
                info.push_str(&format!("{key}: {value}\n"));
            }
            let arm = self.config.crosshair_size * 3.0;
            surface.line(Vector::new(0.0, -arm), Vector::new(0.0, arm), Color::WHITE);
            surface.line(Vector::new(-arm, 0.0), Vector::new(arm, 0.0), Color::WHITE);
            surface.stroke_circle(Vector::ZERO, self.config.world_radius, Color::WHITE);
        }
        if !info.is_empty() {
            surface.overlay_text(&info, Color::WHITE);
        }
    }

    fn draw_overlay(&self, surface: &mut dyn Surface, lifelet: &Lifelet, focused: bool) {
        let config = &self.config;
        let center = lifelet.position();
        let (color, size) = if focused {
            (Color::WHITE, config.crosshair_size * 1.5)
        } else {
            (lifelet.color(), config.crosshair_size)
        };
        surface.line(center - Vector::new(0.0, size), center + Vector::new(0.0, size), color);
        surface.line(center - Vector::new(size, 0.0), center + Vector::new(size, 0.0), color);
        surface.stroke_circle(center, lifelet.visibility(config), Color::WHITE);

        let bar_top = center - Vector::new(0.0, config.crosshair_size * 3.0);
        let health = (lifelet.health() / config.initial_health).max(0.0) * config.bar_size;
        let energy = (lifelet.energy() / config.initial_energy).max(0.0) * config.bar_size;
        surface.fill_rect(bar_top, Vector::new(health, 2.0), Color::RED);
        surface.fill_rect(
            bar_top - Vector::new(0.0, 4.0),
            Vector::new(energy, 2.0),
            Color::YELLOW,
        );
        if focused {
            surface.text(
                center + Vector::new(size, size),
                TextAnchor::TopLeft,
                self.race_name(lifelet.race()),
                color,
            );
        }
    }
}

const UNKNOWN_RACE: &str = "unknown";

/// Palette colours drawn without replacement, then random colours.
fn assign_colors(rng: &mut SmallRng, count: usize) -> Vec<Color> {
    let mut palette = Color::RACE_PALETTE.to_vec();
    (0..count)
        .map(|_| {
            if palette.is_empty() {
                Color::rgb(rng.random(), rng.random(), rng.random())
            } else {
                let index = rng.random_range(0..palette.len());
                palette.remove(index)
            }
        })
        .collect()
}
