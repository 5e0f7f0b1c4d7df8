//! Lifelet state, the per-tick vitals update and the behaviour contract races implement.

use crate::config::SimulationConfig;
use crate::context::LifeletContext;
use crate::draw::{Color, Surface};
use crate::error::LifeletError;
use crate::loop_list::Keyed;
use crate::math::Vector;
use crate::race::RaceId;
use serde::{Deserialize, Serialize};

/// Identifier of a lifelet, unique for the lifetime of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LifeletId(pub u64);

impl std::fmt::Display for LifeletId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-tick protocol state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationPhase {
    #[default]
    Unprepared,
    Prepared,
    Simulated,
}

/// Race implementation driving one lifelet.
///
/// The world calls [`Behavior::decide`] once per tick and then applies the
/// vitals update itself, so a behaviour can only request movement and trigger
/// actions through the context.
pub trait Behavior: Send {
    /// Runs once right after the lifelet is placed in the world.
    fn on_spawn(&mut self, _ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        Ok(())
    }

    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError>;

    /// Extra properties listed on the inspection overlay.
    fn describe(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// An agent in the world.
pub struct Lifelet {
    id: LifeletId,
    race: RaceId,
    position: Vector,
    velocity: Vector,
    requested_velocity: Vector,
    age: u64,
    health: f64,
    last_health: f64,
    energy: f64,
    last_energy: f64,
    color: Color,
    last_talk: Option<u64>,
    last_attack: Option<u64>,
    last_give: Option<u64>,
    phase: SimulationPhase,
    alive: bool,
    behavior: Option<Box<dyn Behavior>>,
}

impl std::fmt::Debug for Lifelet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lifelet")
            .field("id", &self.id)
            .field("race", &self.race)
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("age", &self.age)
            .field("health", &self.health)
            .field("energy", &self.energy)
            .field("phase", &self.phase)
            .field("alive", &self.alive)
            .field("has_behavior", &self.behavior.is_some())
            .finish()
    }
}

impl Keyed for Lifelet {
    type Key = LifeletId;

    fn key(&self) -> LifeletId {
        self.id
    }
}

/// What happened to energy and health during one vitals update.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VitalsOutcome {
    pub moved: bool,
    pub died: bool,
}

impl Lifelet {
    #[must_use]
    pub fn new(
        id: LifeletId,
        race: RaceId,
        position: Vector,
        color: Color,
        config: &SimulationConfig,
        behavior: Option<Box<dyn Behavior>>,
    ) -> Self {
        Self {
            id,
            race,
            position,
            velocity: Vector::ZERO,
            requested_velocity: Vector::ZERO,
            age: 0,
            health: config.initial_health,
            last_health: config.initial_health,
            energy: config.initial_energy,
            last_energy: config.initial_energy,
            color,
            last_talk: None,
            last_attack: None,
            last_give: None,
            phase: SimulationPhase::Unprepared,
            alive: true,
            behavior,
        }
    }

    #[must_use]
    pub fn id(&self) -> LifeletId {
        self.id
    }

    #[must_use]
    pub fn race(&self) -> RaceId {
        self.race
    }

    #[must_use]
    pub fn position(&self) -> Vector {
        self.position
    }

    /// Velocity committed during the last vitals update.
    #[must_use]
    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    /// Velocity the behaviour asked for; kept until changed.
    #[must_use]
    pub fn requested_velocity(&self) -> Vector {
        self.requested_velocity
    }

    #[must_use]
    pub fn age(&self) -> u64 {
        self.age
    }

    #[must_use]
    pub fn health(&self) -> f64 {
        self.health
    }

    #[must_use]
    pub fn energy(&self) -> f64 {
        self.energy
    }

    #[must_use]
    pub fn last_health(&self) -> f64 {
        self.last_health
    }

    #[must_use]
    pub fn last_energy(&self) -> f64 {
        self.last_energy
    }

    #[must_use]
    pub fn color(&self) -> Color {
        self.color
    }

    #[must_use]
    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    #[must_use]
    pub fn distance(&self, point: Vector) -> f64 {
        self.position.distance(point)
    }

    /// Sensing radius; failing health shrinks it.
    #[must_use]
    pub fn visibility(&self, config: &SimulationConfig) -> f64 {
        (self.health / config.initial_health) * config.vision_radius
    }

    /// True while energy sits below the low-energy threshold.
    #[must_use]
    pub fn critical_energy(&self, config: &SimulationConfig) -> bool {
        self.energy < config.initial_energy * config.low_energy_health_bounds
    }

    /// Ticks until health runs out at the last observed rate, if it is falling.
    #[must_use]
    pub fn health_expectancy(&self) -> Option<u64> {
        expectancy(self.last_health, self.health)
    }

    /// Ticks until energy runs out at the last observed rate, if it is falling.
    #[must_use]
    pub fn energy_expectancy(&self) -> Option<u64> {
        expectancy(self.last_energy, self.energy)
    }

    /// Age at which the lifelet is expected to die.
    #[must_use]
    pub fn life_expectancy(&self) -> Option<u64> {
        let remaining = match (self.health_expectancy(), self.energy_expectancy()) {
            (Some(h), Some(e)) => Some(h.min(e)),
            (h, e) => h.or(e),
        };
        remaining.map(|ticks| self.age.saturating_add(ticks))
    }

    #[must_use]
    pub fn can_talk(&self, config: &SimulationConfig) -> bool {
        cooled_down(self.age, self.last_talk, config.talk_delay)
    }

    #[must_use]
    pub fn can_attack(&self, config: &SimulationConfig) -> bool {
        cooled_down(self.age, self.last_attack, config.attack_delay)
    }

    #[must_use]
    pub fn can_give_energy(&self, config: &SimulationConfig) -> bool {
        cooled_down(self.age, self.last_give, config.give_energy_delay)
    }

    /// Properties shown on the inspection overlay.
    #[must_use]
    pub fn describe(&self, config: &SimulationConfig) -> Vec<(&'static str, String)> {
        let ticks = |value: Option<u64>| value.map_or_else(|| "-".to_owned(), |v| v.to_string());
        let mut properties = vec![
            ("Id", self.id.to_string()),
            ("Age", self.age.to_string()),
            ("Position", self.position.to_string()),
            ("Velocity", self.velocity.to_string()),
            ("Health", format!("{:.3}", self.health)),
            ("Energy", format!("{:.3}", self.energy)),
            ("Visibility", format!("{:.2}", self.visibility(config))),
            ("CriticalEnergy", self.critical_energy(config).to_string()),
            ("HealthExpectancy", ticks(self.health_expectancy())),
            ("EnergyExpectancy", ticks(self.energy_expectancy())),
            ("LifeExpectancy", ticks(self.life_expectancy())),
            ("CanTalk", self.can_talk(config).to_string()),
            ("CanAttack", self.can_attack(config).to_string()),
            ("CanGiveEnergy", self.can_give_energy(config).to_string()),
        ];
        if let Some(behavior) = &self.behavior {
            properties.extend(behavior.describe());
        }
        properties
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        surface.fill_circle(self.position, 2.0, self.color);
    }

    pub(crate) fn prepare(&mut self) {
        self.phase = SimulationPhase::Prepared;
    }

    pub(crate) fn take_behavior(&mut self) -> Option<Box<dyn Behavior>> {
        self.behavior.take()
    }

    pub(crate) fn restore_behavior(&mut self, behavior: Option<Box<dyn Behavior>>) {
        if behavior.is_some() {
            self.behavior = behavior;
        }
    }

    pub(crate) fn request_velocity(&mut self, velocity: Vector) {
        self.requested_velocity = velocity;
    }

    pub(crate) fn stamp_talk(&mut self) {
        self.last_talk = Some(self.age);
    }

    pub(crate) fn stamp_attack(&mut self) {
        self.last_attack = Some(self.age);
    }

    pub(crate) fn stamp_give(&mut self) {
        self.last_give = Some(self.age);
    }

    pub(crate) fn spend_energy(&mut self, amount: f64) {
        self.energy -= amount;
    }

    pub(crate) fn receive_energy(&mut self, amount: f64) {
        self.energy += amount;
    }

    /// Apply attack damage and report whether the lifelet is now dead.
    pub(crate) fn receive_damage(&mut self, damage: f64, minimum_health: f64) -> bool {
        self.health -= damage;
        self.health <= minimum_health
    }

    pub(crate) fn mark_dead(&mut self) {
        self.alive = false;
    }

    /// First half of the vitals update: aging and natural energy decay.
    pub(crate) fn metabolize(&mut self, config: &SimulationConfig) {
        self.age += config.age_increment;
        self.last_energy = self.energy;
        self.energy = (self.energy - config.natural_energy_decrement).max(config.minimum_energy);
    }

    /// Second half of the vitals update: bounds check, energy-gated movement,
    /// integration and health decay. Food pickup happens between the halves.
    ///
    /// Movement is committed only when the energy left after paying for it
    /// stays strictly above `minimum_energy`, so energy never reaches the
    /// floor by moving. Anything less leaves the lifelet standing still.
    pub(crate) fn resolve_motion(&mut self, config: &SimulationConfig) -> VitalsOutcome {
        if (self.position + self.requested_velocity).norm() > config.world_radius {
            self.requested_velocity = Vector::ZERO;
        }

        let cost = self.requested_velocity.norm() * config.movement_energy_multiplier;
        let moved = if self.energy - cost > config.minimum_energy {
            self.energy -= cost;
            self.velocity = self.requested_velocity;
            self.velocity != Vector::ZERO
        } else {
            self.velocity = Vector::ZERO;
            false
        };
        self.position += self.velocity;

        self.last_health = self.health;
        self.health -= config.natural_health_decrement;
        if self.critical_energy(config) {
            self.health -= config.low_energy_health_decrement;
        }
        let died = self.health <= config.minimum_health;
        self.phase = SimulationPhase::Simulated;
        VitalsOutcome { moved, died }
    }
}

fn cooled_down(age: u64, last: Option<u64>, delay: u64) -> bool {
    last.is_none_or(|stamp| age > stamp.saturating_add(delay))
}

fn expectancy(last: f64, current: f64) -> Option<u64> {
    let delta = last - current;
    if delta > 0.0 {
        Some((current.max(0.0) / delta) as u64)
    } else {
        None
    }
}
