//! Squadron members circle their leader while the leader heads for the centre
//! of the world.

use lifesim_core::{
    Behavior, LifeletContext, LifeletError, LifeletId, RaceId, RaceRegistry, Vector,
};
use rand::{Rng, RngCore};
use std::f64::consts::TAU;

use crate::{ROLL_CALL, boxed, elect};

const ESCORT_SPEED: f64 = 3.0;
const LEADER_SPEED: f64 = 1.0;
const ORBIT_RADIUS: f64 = 12.0;
/// Radians the orbit slot advances per tick.
const ORBIT_STEP: f64 = 0.05;

#[derive(Debug, Clone)]
pub struct SquadronRace {
    leader: Option<LifeletId>,
    bearing: f64,
}

impl SquadronRace {
    pub const NAME: &'static str = "Squadron";
    pub const AUTHOR: &'static str = "stephinity";

    #[must_use]
    pub fn random(rng: &mut dyn RngCore) -> Self {
        Self {
            leader: None,
            bearing: rng.random_range(0.0..TAU),
        }
    }

    pub fn register(registry: &mut RaceRegistry) -> RaceId {
        registry.register(Self::NAME, Self::AUTHOR, |rng| boxed(Self::random(rng)))
    }

    #[must_use]
    pub fn leader(&self) -> Option<LifeletId> {
        self.leader
    }
}

impl Behavior for SquadronRace {
    fn on_spawn(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        ctx.talk(ROLL_CALL).map(|_| ())
    }

    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        let heard = ctx.audible_messages();
        self.leader = elect(&heard, ctx.id(), self.leader, |sender, best| sender > best);

        match self.leader.and_then(|id| ctx.shell_of(id)) {
            Some(leader) => {
                self.bearing = (self.bearing + ORBIT_STEP) % TAU;
                let slot = leader.position(&*ctx)? + Vector::from_angle(ORBIT_RADIUS, self.bearing);
                // Slow down on arrival instead of overshooting the slot.
                let offset = slot - ctx.position();
                ctx.move_by(offset.clamp_norm(ESCORT_SPEED));
            }
            None => {
                self.leader = None;
                ctx.move_to_destination(Vector::ZERO, LEADER_SPEED);
            }
        }
        Ok(())
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        let leader = self.leader.map_or_else(|| "-".to_owned(), |id| id.to_string());
        vec![("Leader", leader), ("Bearing", format!("{:.2}", self.bearing))]
    }
}
