//! The whole race gathers around its oldest member, which eats everything it
//! meets, kin included, and grows into a single heavily fed lifelet.

use lifesim_core::{Behavior, LifeletContext, LifeletError, LifeletId, RaceId, RaceRegistry};
use rand::RngCore;
use tracing::debug;

use crate::{ROLL_CALL, boxed, elect};

const SPEED: f64 = 1.0;
const HUNT_SPEED_FACTOR: f64 = 3.0;
const BITE: f64 = 10.0;

#[derive(Debug, Clone, Default)]
pub struct CannibalRace {
    leader: Option<LifeletId>,
}

impl CannibalRace {
    pub const NAME: &'static str = "Cannibal";
    pub const AUTHOR: &'static str = "Dan Krusi";

    #[must_use]
    pub fn random(_rng: &mut dyn RngCore) -> Self {
        Self::default()
    }

    pub fn register(registry: &mut RaceRegistry) -> RaceId {
        registry.register(Self::NAME, Self::AUTHOR, |rng| boxed(Self::random(rng)))
    }

    /// A lifelet that has not heard of anyone older leads the feast.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.leader.is_none()
    }

    fn hunt(ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        let speed = SPEED * HUNT_SPEED_FACTOR;
        match ctx.visible_lifelets().into_iter().next() {
            Some(prey) => {
                // The bite may kill the prey, so aim first.
                let destination = prey.position(&*ctx)?;
                ctx.attack(&prey, BITE)?;
                ctx.move_to_destination(destination, speed);
            }
            None => ctx.move_randomly(speed),
        }
        Ok(())
    }
}

impl Behavior for CannibalRace {
    fn on_spawn(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        ctx.talk(ROLL_CALL).map(|_| ())
    }

    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        let heard = ctx.audible_messages();
        self.leader = elect(&heard, ctx.id(), self.leader, |sender, best| sender < best);

        match self.leader.and_then(|id| ctx.shell_of(id)) {
            Some(leader) => {
                let destination = leader.position(&*ctx)?;
                ctx.move_to_destination(destination, SPEED);
            }
            None => {
                if let Some(lost) = self.leader.take() {
                    debug!(lifelet = %ctx.id(), %lost, "cannibal leader gone, taking over");
                }
                Self::hunt(ctx)?;
            }
        }
        Ok(())
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        vec![("Cannibal leader", self.is_leader().to_string())]
    }
}
