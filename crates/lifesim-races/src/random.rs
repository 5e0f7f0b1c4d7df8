//! Wanders in a straight line and occasionally changes its mind.

use lifesim_core::{Behavior, LifeletContext, LifeletError, RaceId, RaceRegistry, Vector};
use rand::{Rng, RngCore};

use crate::boxed;

const TURN_ODDS: u32 = 200;
const SPEED_ODDS: u32 = 150;
const CHATTER_ODDS: u32 = 250;
const MAX_SPEED: u32 = 2;

/// Random walker that now and then blurts out a random character.
#[derive(Debug, Clone)]
pub struct RandomRace {
    direction: Vector,
    speed: f64,
}

impl RandomRace {
    pub const NAME: &'static str = "Random";
    pub const AUTHOR: &'static str = "Dan Krusi";

    #[must_use]
    pub fn random(rng: &mut dyn RngCore) -> Self {
        Self {
            direction: random_direction(rng),
            speed: 2.0,
        }
    }

    pub fn register(registry: &mut RaceRegistry) -> RaceId {
        registry.register(Self::NAME, Self::AUTHOR, |rng| boxed(Self::random(rng)))
    }
}

/// Unit-grid direction with components in {-1, 0, 1}; may be zero.
pub(crate) fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector {
    Vector::new(
        f64::from(rng.random_range(-1_i32..=1)),
        f64::from(rng.random_range(-1_i32..=1)),
    )
}

impl Behavior for RandomRace {
    fn decide(&mut self, ctx: &mut LifeletContext<'_>) -> Result<(), LifeletError> {
        if ctx.rng().random_range(0..TURN_ODDS) == 0 {
            self.direction = random_direction(ctx.rng());
        }
        if ctx.rng().random_range(0..SPEED_ODDS) == 0 {
            self.speed = f64::from(ctx.rng().random_range(0..=MAX_SPEED));
        }
        if ctx.rng().random_range(0..CHATTER_ODDS) == 0 {
            let alphabet: Vec<char> = ctx.config().message_alphabet.chars().collect();
            let pick = ctx.rng().random_range(0..alphabet.len());
            ctx.talk(alphabet[pick])?;
        }
        ctx.move_by(self.direction * self.speed);
        Ok(())
    }

    fn describe(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Direction", self.direction.to_string()),
            ("Speed", format!("{:.0}", self.speed)),
        ]
    }
}
