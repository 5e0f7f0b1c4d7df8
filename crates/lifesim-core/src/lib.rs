//! Core types and the tick-based simulation engine for lifelet worlds.
//!
//! A [`World`] owns three deferred-mutation collections (lifelets, food and
//! messages) and advances them once per [`World::simulate`] call. Race code
//! plugs in through the [`Behavior`] trait and only ever touches the world via
//! a [`LifeletContext`] during its own turn; other lifelets are seen through
//! tick-scoped [`Shell`] handles.

pub mod config;
pub mod context;
pub mod draw;
pub mod entity;
pub mod error;
pub mod lifelet;
pub mod loop_list;
pub mod math;
pub mod race;
pub mod shell;
pub mod world;

use serde::{Deserialize, Serialize};

pub use config::{AttackDamage, DEFAULT_MESSAGE_ALPHABET, SimulationConfig, SpawnMethod};
pub use context::{ActionOutcome, LifeletContext};
pub use draw::{Color, DrawCommand, RecordingSurface, Surface, TextAnchor};
pub use entity::{Entity, EntityId, Food, Lifecycle, Message, Obstacle};
pub use error::{LifeletError, WorldError};
pub use lifelet::{Behavior, Lifelet, LifeletId, SimulationPhase};
pub use loop_list::{Keyed, LoopList, Staging};
pub use math::Vector;
pub use race::{RaceId, RaceRegistry};
pub use shell::{LifeletLookup, Shell, TickClock};
pub use world::{StatValue, TickReport, World};

/// High level simulation clock (ticks processed since the world was created).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tick(pub u64);

impl Tick {
    /// Returns the next sequential tick.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// The tick a freshly created world starts at.
    #[must_use]
    pub const fn zero() -> Self {
        Self(0)
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
