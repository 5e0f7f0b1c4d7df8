use crate::Tick;
use crate::lifelet::LifeletId;
use crate::race::RaceId;
use thiserror::Error;

/// Errors emitted while building or stepping a world.
#[derive(Debug, Error)]
pub enum WorldError {
    /// Indicates an invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    /// A world needs at least one registered race to spawn lifelets.
    #[error("no races registered")]
    NoRaces,
    /// A lifelet finished its turn without the vitals update being applied.
    #[error("lifelet {lifelet:?} of race {race:?} ended its turn unsimulated")]
    ProtocolViolation { lifelet: LifeletId, race: RaceId },
    /// A race behaviour returned an error out of `decide` or `on_spawn`.
    #[error("behaviour of lifelet {lifelet:?} (race {race}) failed")]
    Behavior {
        lifelet: LifeletId,
        race: String,
        #[source]
        source: LifeletError,
    },
}

/// Errors a race implementation can trigger from inside its turn.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifeletError {
    /// A shell was read after the tick it was created in.
    #[error("shell of lifelet {target:?} was created at tick {} but the world is at tick {}", stamped.0, current.0)]
    ExpiredShell {
        target: LifeletId,
        stamped: Tick,
        current: Tick,
    },
    /// A shell was read after its target died.
    #[error("lifelet {target:?} is no longer alive")]
    TargetGone { target: LifeletId },
    /// `talk` was called with a character outside the message alphabet.
    #[error("character {character:?} is not part of the message alphabet")]
    InvalidMessage { character: char },
}
