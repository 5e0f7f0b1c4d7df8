//! Example races for the lifesim arena.
//!
//! Every race here is an ordinary client of the public `lifesim-core` API: it
//! implements [`Behavior`] and only acts through its [`LifeletContext`]. Three
//! of them find each other by shouting `'!'` when they spawn and electing a
//! leader from the sender ids they hear.
//!
//! [`LifeletContext`]: lifesim_core::LifeletContext

pub mod cannibal;
pub mod random;
pub mod snake;
pub mod squadron;

use lifesim_core::{Behavior, LifeletId, Message, RaceRegistry};

pub use cannibal::CannibalRace;
pub use random::RandomRace;
pub use snake::SnakeRace;
pub use squadron::SquadronRace;

/// Message a lifelet shouts right after spawning to announce itself.
pub const ROLL_CALL: char = '!';

/// Names of the races shipped with this crate, in registration order.
pub const BUILTIN_RACES: [&str; 4] = [
    RandomRace::NAME,
    SnakeRace::NAME,
    CannibalRace::NAME,
    SquadronRace::NAME,
];

/// Registers every built-in race into `registry`.
pub fn install(registry: &mut RaceRegistry) {
    RandomRace::register(registry);
    SnakeRace::register(registry);
    CannibalRace::register(registry);
    SquadronRace::register(registry);
}

/// A registry holding every built-in race.
#[must_use]
pub fn default_registry() -> RaceRegistry {
    let mut registry = RaceRegistry::new();
    install(&mut registry);
    registry
}

/// Sender of a roll call heard in `messages` that `prefer` ranks above `current`.
///
/// Only senders with a smaller id than `me` are considered, so every group
/// converges on a chain (or a star) rooted at its oldest member.
pub(crate) fn elect<P>(
    messages: &[Message],
    me: LifeletId,
    current: Option<LifeletId>,
    prefer: P,
) -> Option<LifeletId>
where
    P: Fn(LifeletId, LifeletId) -> bool,
{
    messages
        .iter()
        .filter(|message| message.content() == ROLL_CALL && message.sender() < me)
        .map(Message::sender)
        .fold(current, |best, sender| match best {
            Some(best) if !prefer(sender, best) => Some(best),
            _ => Some(sender),
        })
}

pub(crate) fn boxed<B: Behavior + 'static>(behavior: B) -> Box<dyn Behavior> {
    Box::new(behavior)
}
