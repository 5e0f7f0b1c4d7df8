//! Lifelets of this race line up behind one another and crawl around as a
//! chain. The head hunts for food; followers shout `'F'` when they spot some so
//! the head can steer towards it, and surplus energy is passed back down the
//! chain.

use lifesim_core::{
    Behavior, Entity, LifeletContext, LifeletError, LifeletId, RaceId, RaceRegistry, Vector,
};
use rand::{Rng, RngCore};
use tracing::debug;

use crate::random::random_direction;
use crate::{ROLL_CALL, boxed, elect};

/// Message announcing food nearby.
pub const FOOD_CALL: char = 'F';

const CRAWL_SPEED: f64 = 2.0;
const TURN_ODDS: u32 = 80;
/// Followers stop once they are this much closer than their visibility.
const CATCH_UP_SLACK: f64 = 4.0;
/// Energy above this is handed to the next lifelet down the chain.
const ENERGY_RESERVE: f64 = 100.0;

#[derive(Debug, Clone)]
pub struct SnakeRace {
    direction: Vector,
    speed: f64,
    following: Option<LifeletId>,
}

impl SnakeRace {
    pub const NAME: &'static str = "Snake";
    pub const AUTHOR: &'static str = "Dan Krusi";

    #[must_use]
    pub fn random(rng: &mut dyn RngCore) -> Self {
        Self {
            direction: random_direction(rng),
            speed: CRAWL_SPEED,
            following: None,
        }
    }

    pub fn register(registry: &mut RaceRegistry) -> RaceId {
        registry.register(Self::NAME, Self::AUTHOR, |rng| boxed(Self::random(rng)))
    }

    /// Lifelet this one trails behind, if it is not the head of its chain.
    #[must_use]
    pub fn following(&self) -> Option<LifeletId> {
        self.following
    }

    fn follow(&mut self, ctx: &mut LifeletContext<'_>, leader: Vector) -> Result<(), LifeletError> {
        self.direction = leader - ctx.position();
        self.speed = if leader.distance(ctx.position()) > ctx.visibility() - CATCH_UP_SLACK {
            CRAWL_SPEED
        } else {
            0.0
        };
        if !ctx.visible_food().is_empty() {
            ctx.talk(FOOD_CALL)?;
        }
        Ok(())
    }

    fn lead(&mut self, ctx: &mut LifeletContext<'_>, rumour: Option<Vector>) {
        self.speed = CRAWL_SPEED;
        let here = ctx.position();
        if let Some(food) = ctx.visible_food().first() {
            self.direction = food.position() - here;
        } else if let Some(spot) = rumour {
            self.direction = spot - here;
        } else if ctx.rng().random_range(0..TURN_ODDS) == 0 {
            self.direction = random_direction(ctx.rng());
            if self.direction == Vector::ZERO {
                self.direction = Vector::new(1.0, 1.0);
            }
        }
    }

    fn share_surplus(&self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        let surplus = ctx.energy() - ENERGY_RESERVE;
        if surplus <= 0.0 {
            return Ok(());
        }
        let race = ctx.race();
        for shell in ctx.visible_lifelets() {
            if Some(shell.id()?) != self.following && shell.race()? == race {
                ctx.give_energy(&shell, surplus)?;
                break;
            }
        }
        Ok(())
    }
}

impl Behavior for SnakeRace {
    fn on_spawn(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        ctx.talk(ROLL_CALL).map(|_| ())
    }

    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        let heard = ctx.audible_messages();
        let elected = elect(&heard, ctx.id(), self.following, |sender, best| sender > best);
        if let Some(leader) = elected
            && elected != self.following
        {
            debug!(lifelet = %ctx.id(), %leader, "snake joined a chain");
        }
        self.following = elected;
        let rumour = heard
            .iter()
            .rev()
            .find(|message| message.content() == FOOD_CALL)
            .map(|message| message.position());

        // A dead leader leaves this lifelet at the head of what remains.
        let leader = self.following.and_then(|id| ctx.shell_of(id));
        match leader {
            Some(leader) => {
                let destination = leader.position(&*ctx)?;
                self.follow(ctx, destination)?;
            }
            None => {
                self.following = None;
                self.lead(ctx, rumour);
            }
        }

        self.share_surplus(ctx)?;
        ctx.move_by(self.direction.normalize() * self.speed);
        Ok(())
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        let following = self
            .following
            .map_or_else(|| "nobody (head)".to_owned(), |id| id.to_string());
        vec![("Following", following)]
    }
}
