use crate::error::WorldError;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// Strategy used to place the initial population.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpawnMethod {
    /// Each race gets an angular slot on the spawn ring and its members are
    /// dispersed around that slot.
    #[default]
    GroupedOnRing,
    /// Every lifelet gets its own random angle on the spawn ring.
    RandomOnRing,
    /// Lifelets are scattered uniformly over the spawn disc.
    Scattered,
}

/// How much health an attack removes from its target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum AttackDamage {
    /// Flat penalty regardless of the energy spent.
    Fixed(f64),
    /// Damage proportional to the energy spent on the attack.
    Scaled { per_energy: f64 },
}

impl AttackDamage {
    /// Health penalty for an attack paid with `energy`.
    #[must_use]
    pub fn for_energy(self, energy: f64) -> f64 {
        match self {
            Self::Fixed(damage) => damage,
            Self::Scaled { per_energy } => energy * per_energy,
        }
    }
}

impl Default for AttackDamage {
    fn default() -> Self {
        Self::Fixed(50.0)
    }
}

/// Static configuration for a lifelet world.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Radius of the world disc centred on the origin.
    pub world_radius: f64,
    /// Total number of lifelets spawned, split evenly between races.
    pub initial_lifelets: usize,
    /// Placement strategy for the initial population.
    pub spawn_method: SpawnMethod,
    /// Radius of the spawn ring (or disc for scattered spawns).
    pub initial_spawn_radius: f64,
    /// Divisor applied to the grouped-ring dispersion amount.
    pub dispersion_ratio: f64,
    /// Maximum offset of a grouped lifelet from its race's slot on the ring.
    pub dispersion_amount: f64,
    /// Food items scattered over the world at spawn time.
    pub initial_food: usize,
    /// Number of ticks between food respawn events; 0 disables respawns.
    pub food_respawn_interval: u64,
    /// Food items added on each respawn event.
    pub food_respawn_amount: usize,
    /// Mean lifetime of a food item in ticks.
    pub food_max_age: u64,
    /// Jitter applied to `food_max_age`.
    pub food_max_age_jitter: u64,
    /// Mean energy carried by a spawned food item.
    pub food_energy: f64,
    /// Jitter applied to `food_energy` (whole units).
    pub food_energy_jitter: u32,
    /// Distance under which a lifelet picks up food.
    pub food_pickup_radius: f64,
    /// Mean lifetime of a message in ticks.
    pub message_max_age: u64,
    /// Jitter applied to `message_max_age`.
    pub message_max_age_jitter: u64,
    /// Characters a lifelet may broadcast.
    pub message_alphabet: String,
    /// Growth of a message's audible radius per tick of age.
    pub message_radius_ratio: f64,
    /// Ticks added to a lifelet's age per simulated tick.
    pub age_increment: u64,
    /// Health of a freshly spawned lifelet; also the reference for health ratios.
    pub initial_health: f64,
    /// Health at or below which a lifelet dies.
    pub minimum_health: f64,
    /// Health lost every tick.
    pub natural_health_decrement: f64,
    /// Fraction of `initial_energy` below which energy is critical.
    pub low_energy_health_bounds: f64,
    /// Extra health lost per tick while energy is critical.
    pub low_energy_health_decrement: f64,
    /// Energy of a freshly spawned lifelet.
    pub initial_energy: f64,
    /// Floor energy never decays below.
    pub minimum_energy: f64,
    /// Energy lost every tick.
    pub natural_energy_decrement: f64,
    /// Energy cost per unit of velocity.
    pub movement_energy_multiplier: f64,
    /// Largest velocity a lifelet may request.
    pub maximum_velocity: f64,
    /// Sensing radius at full health.
    pub vision_radius: f64,
    /// Distance under which an attack lands.
    pub attack_range: f64,
    /// Health penalty model for attacks.
    pub attack_damage: AttackDamage,
    /// Minimum ticks between two `talk` calls.
    pub talk_delay: u64,
    /// Minimum ticks between two `attack` calls.
    pub attack_delay: u64,
    /// Minimum ticks between two `give_energy` calls.
    pub give_energy_delay: u64,
    /// Cursor distance under which a lifelet is highlighted.
    pub mouse_sensitivity: f64,
    /// Half-length of the crosshair drawn over the highlighted lifelet.
    pub crosshair_size: f64,
    /// Width of the health and energy bars in the highlight overlay.
    pub bar_size: f64,
    /// Number of tick reports retained in history.
    pub history_capacity: usize,
    /// Target ticks per second for interactive drivers; 0 runs unthrottled.
    pub tick_rate_hz: u32,
    /// Draw the debug overlay and attach debug colours.
    pub debug: bool,
    /// Optional RNG seed for reproducible worlds.
    pub rng_seed: Option<u64>,
}

/// Alphabet accepted by `talk` unless overridden.
pub const DEFAULT_MESSAGE_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!?#";

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world_radius: 1000.0,
            initial_lifelets: 40,
            spawn_method: SpawnMethod::GroupedOnRing,
            initial_spawn_radius: 300.0,
            dispersion_ratio: 1.0,
            dispersion_amount: 50.0,
            initial_food: 100,
            food_respawn_interval: 50,
            food_respawn_amount: 5,
            food_max_age: 10_000,
            food_max_age_jitter: 3_000,
            food_energy: 15.0,
            food_energy_jitter: 10,
            food_pickup_radius: 10.0,
            message_max_age: 20,
            message_max_age_jitter: 5,
            message_alphabet: DEFAULT_MESSAGE_ALPHABET.to_owned(),
            message_radius_ratio: 6.0,
            age_increment: 1,
            initial_health: 100.0,
            minimum_health: 0.001,
            natural_health_decrement: 0.0001,
            low_energy_health_bounds: 0.10,
            low_energy_health_decrement: 0.1,
            initial_energy: 100.0,
            minimum_energy: 0.001,
            natural_energy_decrement: 0.001,
            movement_energy_multiplier: 0.1,
            maximum_velocity: 3.0,
            vision_radius: 40.0,
            attack_range: 10.0,
            attack_damage: AttackDamage::default(),
            talk_delay: 30,
            attack_delay: 1,
            give_energy_delay: 3,
            mouse_sensitivity: 10.0,
            crosshair_size: 5.0,
            bar_size: 20.0,
            history_capacity: 256,
            tick_rate_hz: 10,
            debug: false,
            rng_seed: None,
        }
    }
}

impl SimulationConfig {
    /// Check every value the world relies on.
    pub fn validate(&self) -> Result<(), WorldError> {
        if !self.numbers().iter().all(|value| value.is_finite()) {
            return Err(WorldError::InvalidConfig("numeric settings must be finite"));
        }
        if self.world_radius <= 0.0 {
            return Err(WorldError::InvalidConfig("world_radius must be positive"));
        }
        if self.initial_spawn_radius < 0.0 || self.initial_spawn_radius > self.world_radius {
            return Err(WorldError::InvalidConfig(
                "initial_spawn_radius must lie within the world",
            ));
        }
        if self.dispersion_ratio <= 0.0 || self.dispersion_amount < 0.0 {
            return Err(WorldError::InvalidConfig(
                "dispersion_ratio must be positive and dispersion_amount non-negative",
            ));
        }
        if !(self.dispersion_amount / self.dispersion_ratio).is_finite() {
            return Err(WorldError::InvalidConfig(
                "dispersion_amount / dispersion_ratio must be finite",
            ));
        }
        if self.food_energy < 0.0 || self.food_pickup_radius < 0.0 {
            return Err(WorldError::InvalidConfig(
                "food energy and pickup radius must be non-negative",
            ));
        }
        if self.message_alphabet.is_empty() {
            return Err(WorldError::InvalidConfig("message_alphabet cannot be empty"));
        }
        if self
            .message_alphabet
            .chars()
            .any(|c| c.to_uppercase().ne(std::iter::once(c)))
        {
            return Err(WorldError::InvalidConfig(
                "message_alphabet must not contain lowercase characters",
            ));
        }
        if self.message_radius_ratio < 0.0 {
            return Err(WorldError::InvalidConfig(
                "message_radius_ratio must be non-negative",
            ));
        }
        if self.initial_health <= self.minimum_health || self.minimum_health < 0.0 {
            return Err(WorldError::InvalidConfig(
                "initial_health must exceed a non-negative minimum_health",
            ));
        }
        if self.initial_energy <= self.minimum_energy || self.minimum_energy < 0.0 {
            return Err(WorldError::InvalidConfig(
                "initial_energy must exceed a non-negative minimum_energy",
            ));
        }
        if self.natural_health_decrement < 0.0
            || self.low_energy_health_decrement < 0.0
            || self.natural_energy_decrement < 0.0
            || self.movement_energy_multiplier < 0.0
            || !(0.0..=1.0).contains(&self.low_energy_health_bounds)
        {
            return Err(WorldError::InvalidConfig(
                "decay rates must be non-negative and low_energy_health_bounds in [0, 1]",
            ));
        }
        if self.maximum_velocity < 0.0 || self.vision_radius <= 0.0 || self.attack_range < 0.0 {
            return Err(WorldError::InvalidConfig(
                "vision_radius must be positive, velocity and attack range non-negative",
            ));
        }
        if self.age_increment == 0 {
            return Err(WorldError::InvalidConfig("age_increment must be positive"));
        }
        if self.history_capacity == 0 {
            return Err(WorldError::InvalidConfig("history_capacity must be positive"));
        }
        Ok(())
    }

    fn numbers(&self) -> [f64; 23] {
        let damage = match self.attack_damage {
            AttackDamage::Fixed(damage) => damage,
            AttackDamage::Scaled { per_energy } => per_energy,
        };
        [
            self.world_radius,
            self.initial_spawn_radius,
            self.dispersion_ratio,
            self.dispersion_amount,
            self.food_energy,
            self.food_pickup_radius,
            self.message_radius_ratio,
            self.initial_health,
            self.minimum_health,
            self.natural_health_decrement,
            self.low_energy_health_bounds,
            self.low_energy_health_decrement,
            self.initial_energy,
            self.minimum_energy,
            self.natural_energy_decrement,
            self.movement_energy_multiplier,
            self.maximum_velocity,
            self.vision_radius,
            self.attack_range,
            damage,
            self.mouse_sensitivity,
            self.crosshair_size,
            self.bar_size,
        ]
    }

    /// Returns the configured RNG seed, generating one from entropy if absent.
    #[must_use]
    pub fn seeded_rng(&self) -> SmallRng {
        match self.rng_seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => {
                let seed: u64 = rand::random();
                SmallRng::seed_from_u64(seed)
            }
        }
    }

    /// Whether `character` (already uppercased) may be broadcast.
    #[must_use]
    pub fn is_in_alphabet(&self, character: char) -> bool {
        self.message_alphabet.contains(character)
    }
}
