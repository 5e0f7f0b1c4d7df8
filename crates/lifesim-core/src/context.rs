//! What a race implementation can see and do during its lifelet's turn.

use crate::Tick;
use crate::config::SimulationConfig;
use crate::entity::{Entity, Food, Message};
use crate::error::LifeletError;
use crate::lifelet::{Lifelet, LifeletId};
use crate::math::{Vector, jittered};
use crate::race::RaceId;
use crate::shell::{LifeletLookup, Shell};
use crate::world::World;
use ordered_float::OrderedFloat;
use rand::Rng;
use rand::rngs::SmallRng;
use tracing::trace;

/// Result of an action that is allowed to silently do nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Performed,
    /// The action's cooldown has not elapsed yet.
    CoolingDown,
    /// Paying for the action would push energy below the minimum.
    InsufficientEnergy,
    /// The target is farther away than the action reaches.
    OutOfRange,
    /// The target died or left the world this tick.
    TargetGone,
    /// Negative or non-finite amounts, or the lifelet targeting itself.
    Rejected,
}

impl ActionOutcome {
    #[must_use]
    pub fn is_performed(self) -> bool {
        self == Self::Performed
    }
}

/// Handle passed to [`Behavior`](crate::Behavior) hooks for the acting lifelet.
///
/// Reads go against the live world. Actions validate cooldowns, energy and range
/// before touching any state, and cross-lifelet effects are applied by id.
pub struct LifeletContext<'w> {
    world: &'w mut World,
    index: usize,
}

impl<'w> LifeletContext<'w> {
    pub(crate) fn new(world: &'w mut World, index: usize) -> Self {
        Self { world, index }
    }

    fn me(&self) -> &Lifelet {
        &self.world.lifelets.as_slice()[self.index]
    }

    fn me_mut(&mut self) -> &mut Lifelet {
        &mut self.world.lifelets.as_mut_slice()[self.index]
    }

    #[must_use]
    pub fn id(&self) -> LifeletId {
        self.me().id()
    }

    #[must_use]
    pub fn race(&self) -> RaceId {
        self.me().race()
    }

    #[must_use]
    pub fn race_name(&self) -> &str {
        self.world.race_name(self.me().race())
    }

    #[must_use]
    pub fn position(&self) -> Vector {
        self.me().position()
    }

    #[must_use]
    pub fn velocity(&self) -> Vector {
        self.me().velocity()
    }

    #[must_use]
    pub fn requested_velocity(&self) -> Vector {
        self.me().requested_velocity()
    }

    #[must_use]
    pub fn age(&self) -> u64 {
        self.me().age()
    }

    #[must_use]
    pub fn health(&self) -> f64 {
        self.me().health()
    }

    #[must_use]
    pub fn energy(&self) -> f64 {
        self.me().energy()
    }

    #[must_use]
    pub fn visibility(&self) -> f64 {
        self.me().visibility(&self.world.config)
    }

    #[must_use]
    pub fn critical_energy(&self) -> bool {
        self.me().critical_energy(&self.world.config)
    }

    #[must_use]
    pub fn health_expectancy(&self) -> Option<u64> {
        self.me().health_expectancy()
    }

    #[must_use]
    pub fn energy_expectancy(&self) -> Option<u64> {
        self.me().energy_expectancy()
    }

    #[must_use]
    pub fn life_expectancy(&self) -> Option<u64> {
        self.me().life_expectancy()
    }

    #[must_use]
    pub fn can_talk(&self) -> bool {
        self.me().can_talk(&self.world.config)
    }

    #[must_use]
    pub fn can_attack(&self) -> bool {
        self.me().can_attack(&self.world.config)
    }

    #[must_use]
    pub fn can_give_energy(&self) -> bool {
        self.me().can_give_energy(&self.world.config)
    }

    /// Current world tick.
    #[must_use]
    pub fn tick(&self) -> Tick {
        self.world.tick()
    }

    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.world.config
    }

    /// The world's seeded random source.
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.world.rng
    }

    /// Shells of every other living lifelet closer than our visibility.
    #[must_use]
    pub fn visible_lifelets(&self) -> Vec<Shell> {
        let me = self.me();
        let origin = me.position();
        let reach = me.visibility(&self.world.config);
        self.world
            .lifelets
            .iter()
            .filter(|other| other.is_alive() && other.id() != me.id())
            .filter(|other| other.distance(origin) < reach)
            .map(|other| self.world.capture_shell(other))
            .collect()
    }

    /// Food closer than our visibility.
    #[must_use]
    pub fn visible_food(&self) -> Vec<Food> {
        let origin = self.position();
        let reach = self.visibility();
        self.world
            .food
            .iter()
            .filter(|food| food.distance(origin) < reach)
            .cloned()
            .collect()
    }

    /// Messages whose wavefront has come within our visibility.
    #[must_use]
    pub fn audible_messages(&self) -> Vec<Message> {
        let origin = self.position();
        let reach = self.visibility();
        self.world
            .messages
            .iter()
            .filter(|message| message.is_audible_from(origin, reach))
            .cloned()
            .collect()
    }

    /// Nearest visible lifelet.
    #[must_use]
    pub fn closest_visible(&self) -> Option<Shell> {
        let origin = self.position();
        self.visible_lifelets().into_iter().min_by_key(|shell| {
            OrderedFloat(shell.distance(self, origin).unwrap_or(f64::INFINITY))
        })
    }

    /// Visible lifelet with the given id.
    #[must_use]
    pub fn visible_by_id(&self, id: LifeletId) -> Option<Shell> {
        let origin = self.position();
        let reach = self.visibility();
        self.world
            .lifelets
            .find(id)
            .filter(|other| other.is_alive() && other.id() != self.id())
            .filter(|other| other.distance(origin) < reach)
            .map(|other| self.world.capture_shell(other))
    }

    /// Shell of any living lifelet, e.g. the sender of a message heard earlier.
    #[must_use]
    pub fn shell_of(&self, id: LifeletId) -> Option<Shell> {
        self.world.shell_of(id)
    }

    /// Request a velocity for this tick, capped at the maximum speed.
    pub fn move_by(&mut self, velocity: Vector) {
        let capped = velocity.clamp_norm(self.world.config.maximum_velocity);
        self.me_mut().request_velocity(capped);
    }

    /// Head towards `destination` at `speed`.
    pub fn move_to_destination(&mut self, destination: Vector, speed: f64) {
        let direction = (destination - self.position()).normalize();
        self.move_by(direction * speed);
    }

    /// Pick a random whole-number velocity with components in `[-speed, speed]`.
    pub fn move_randomly(&mut self, speed: f64) {
        let bound = speed.abs() as i64;
        let rng = &mut self.world.rng;
        let x = rng.random_range(-bound..=bound) as f64;
        let y = rng.random_range(-bound..=bound) as f64;
        self.move_by(Vector::new(x, y));
    }

    /// Broadcast a single character from the current position.
    ///
    /// The character is uppercased first; anything outside the message
    /// alphabet fails with [`LifeletError::InvalidMessage`].
    pub fn talk(&mut self, character: char) -> Result<ActionOutcome, LifeletError> {
        let mut upper = character.to_uppercase();
        let content = match (upper.next(), upper.next()) {
            (Some(c), None) if self.world.config.is_in_alphabet(c) => c,
            _ => return Err(LifeletError::InvalidMessage { character }),
        };
        if !self.can_talk() {
            return Ok(ActionOutcome::CoolingDown);
        }

        let config = &self.world.config;
        let (base, jitter, ratio) = (
            config.message_max_age as i64,
            config.message_max_age_jitter as i64,
            config.message_radius_ratio,
        );
        let max_age = jittered(&mut self.world.rng, base, jitter).max(0) as u64;
        let id = self.world.next_entity_id();
        let sender = self.id();
        let message = Message::new(id, self.position(), content, sender, ratio, max_age);
        self.world.messages.add(message);
        self.me_mut().stamp_talk();
        self.world.counters.messages_sent += 1;
        trace!(lifelet = %sender, %content, "talk");
        Ok(ActionOutcome::Performed)
    }

    /// Hand `amount` energy to a visible lifelet.
    pub fn give_energy(&mut self, target: &Shell, amount: f64) -> Result<ActionOutcome, LifeletError> {
        let target_id = target.id()?;
        if !self.can_give_energy() {
            return Ok(ActionOutcome::CoolingDown);
        }
        let reach = self.visibility();
        let target_index = match self.resolve_target(target_id, amount, reach) {
            Ok(index) => index,
            Err(outcome) => return Ok(outcome),
        };

        self.me_mut().spend_energy(amount);
        self.me_mut().stamp_give();
        self.world.lifelets.as_mut_slice()[target_index].receive_energy(amount);
        self.world.counters.energy_given += amount;
        trace!(lifelet = %self.id(), target = %target_id, amount, "give_energy");
        Ok(ActionOutcome::Performed)
    }

    /// Spend `amount` energy attacking a lifelet within attack range.
    pub fn attack(&mut self, target: &Shell, amount: f64) -> Result<ActionOutcome, LifeletError> {
        let target_id = target.id()?;
        if !self.can_attack() {
            return Ok(ActionOutcome::CoolingDown);
        }
        let reach = self.world.config.attack_range;
        let target_index = match self.resolve_target(target_id, amount, reach) {
            Ok(index) => index,
            Err(outcome) => return Ok(outcome),
        };

        self.me_mut().spend_energy(amount);
        self.me_mut().stamp_attack();
        let damage = self.world.config.attack_damage.for_energy(amount);
        let minimum_health = self.world.config.minimum_health;
        let killed =
            self.world.lifelets.as_mut_slice()[target_index].receive_damage(damage, minimum_health);
        self.world.counters.attacks += 1;
        trace!(lifelet = %self.id(), target = %target_id, damage, killed, "attack");
        if killed {
            self.world.kill(target_index);
        }
        Ok(ActionOutcome::Performed)
    }

    /// Shared checks for energy transfers: amount, energy, liveness and range.
    ///
    /// The caller must keep at least `minimum_energy` after paying `amount`;
    /// the floor itself may be reached, unlike with movement.
    fn resolve_target(
        &self,
        target: LifeletId,
        amount: f64,
        reach: f64,
    ) -> Result<usize, ActionOutcome> {
        if !amount.is_finite() || amount < 0.0 || target == self.id() {
            return Err(ActionOutcome::Rejected);
        }
        if self.energy() - amount < self.world.config.minimum_energy {
            return Err(ActionOutcome::InsufficientEnergy);
        }
        let index = self
            .world
            .lifelets
            .index_of(target)
            .filter(|&index| self.world.lifelets.as_slice()[index].is_alive())
            .ok_or(ActionOutcome::TargetGone)?;
        let distance = self.world.lifelets.as_slice()[index].distance(self.position());
        if distance < reach {
            Ok(index)
        } else {
            Err(ActionOutcome::OutOfRange)
        }
    }
}

impl LifeletLookup for LifeletContext<'_> {
    fn lookup(&self, id: LifeletId) -> Option<&Lifelet> {
        self.world.lifelets.find(id)
    }

    fn settings(&self) -> &SimulationConfig {
        &self.world.config
    }
}
