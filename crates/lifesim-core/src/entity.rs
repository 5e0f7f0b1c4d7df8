//! Passive world objects: the shared obstacle base plus food and messages.

use crate::draw::{Color, Surface, TextAnchor};
use crate::lifelet::LifeletId;
use crate::loop_list::Keyed;
use crate::math::Vector;
use serde::{Deserialize, Serialize};

/// Identifier of a passive entity, unique for the lifetime of a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u64);

/// Outcome of aging an entity by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Alive,
    Expired,
}

/// Identity, position and age shared by every passive entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub position: Vector,
    pub age: u64,
    pub max_age: Option<u64>,
}

impl Obstacle {
    #[must_use]
    pub fn new(id: EntityId, position: Vector, max_age: Option<u64>) -> Self {
        Self {
            id,
            position,
            age: 0,
            max_age,
        }
    }

    /// Age by one tick.
    pub fn simulate(&mut self) {
        self.age += 1;
    }

    /// True once the age has passed the maximum age.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.max_age.is_some_and(|max| self.age > max)
    }

    #[must_use]
    pub fn distance(&self, point: Vector) -> f64 {
        self.position.distance(point)
    }
}

/// Behaviour common to food and messages.
pub trait Entity {
    fn obstacle(&self) -> &Obstacle;

    fn obstacle_mut(&mut self) -> &mut Obstacle;

    /// Advance one tick and report whether the entity should leave its collection.
    fn simulate(&mut self) -> Lifecycle {
        let obstacle = self.obstacle_mut();
        obstacle.simulate();
        if obstacle.is_expired() {
            Lifecycle::Expired
        } else {
            Lifecycle::Alive
        }
    }

    fn draw(&self, _surface: &mut dyn Surface) {}

    fn id(&self) -> EntityId {
        self.obstacle().id
    }

    fn position(&self) -> Vector {
        self.obstacle().position
    }

    fn age(&self) -> u64 {
        self.obstacle().age
    }

    fn distance(&self, point: Vector) -> f64 {
        self.obstacle().distance(point)
    }
}

/// Piece of food carrying a fixed amount of energy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    base: Obstacle,
    energy: f64,
}

impl Food {
    #[must_use]
    pub fn new(id: EntityId, position: Vector, energy: f64, max_age: u64) -> Self {
        Self {
            base: Obstacle::new(id, position, Some(max_age)),
            energy,
        }
    }

    #[must_use]
    pub fn energy(&self) -> f64 {
        self.energy
    }
}

impl Entity for Food {
    fn obstacle(&self) -> &Obstacle {
        &self.base
    }

    fn obstacle_mut(&mut self) -> &mut Obstacle {
        &mut self.base
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let origin = self.base.position - Vector::new(1.0, 1.0);
        surface.fill_rect(origin, Vector::new(2.0, 2.0), Color::YELLOW);
    }
}

impl Keyed for Food {
    type Key = EntityId;

    fn key(&self) -> EntityId {
        self.base.id
    }
}

/// Single-character broadcast whose audible radius grows with age.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    base: Obstacle,
    content: char,
    sender: LifeletId,
    radius_ratio: f64,
}

impl Message {
    #[must_use]
    pub fn new(
        id: EntityId,
        position: Vector,
        content: char,
        sender: LifeletId,
        radius_ratio: f64,
        max_age: u64,
    ) -> Self {
        Self {
            base: Obstacle::new(id, position, Some(max_age)),
            content,
            sender,
            radius_ratio,
        }
    }

    #[must_use]
    pub fn content(&self) -> char {
        self.content
    }

    /// Lifelet that broadcast the message. It may have died since.
    #[must_use]
    pub fn sender(&self) -> LifeletId {
        self.sender
    }

    /// Current audible radius.
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.base.age as f64 * self.radius_ratio
    }

    /// Whether a listener at `point` with sensing radius `reach` hears the message.
    #[must_use]
    pub fn is_audible_from(&self, point: Vector, reach: f64) -> bool {
        self.base.distance(point) - self.radius() < reach
    }
}

impl Entity for Message {
    fn obstacle(&self) -> &Obstacle {
        &self.base
    }

    fn obstacle_mut(&mut self) -> &mut Obstacle {
        &mut self.base
    }

    fn draw(&self, surface: &mut dyn Surface) {
        let fade = match self.base.max_age {
            Some(max) if max > 0 => 1.0 - self.base.age as f64 / max as f64,
            _ => 1.0,
        };
        let color = Color::WHITE.with_alpha((fade.clamp(0.0, 1.0) * 255.0) as u8);
        let radius = self.radius();
        surface.stroke_circle(self.base.position, radius, color);
        surface.text(
            self.base.position + Vector::new(0.0, radius),
            TextAnchor::Center,
            &self.content.to_string(),
            color,
        );
    }
}

impl Keyed for Message {
    type Key = EntityId;

    fn key(&self) -> EntityId {
        self.base.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::RecordingSurface;

    #[test]
    fn obstacle_expires_after_max_age() {
        let mut food = Food::new(EntityId(1), Vector::ZERO, 15.0, 2);
        assert_eq!(food.simulate(), Lifecycle::Alive);
        assert_eq!(food.simulate(), Lifecycle::Alive);
        assert_eq!(food.simulate(), Lifecycle::Expired);
        assert_eq!(food.age(), 3);
    }

    #[test]
    fn obstacle_without_max_age_never_expires() {
        let mut obstacle = Obstacle::new(EntityId(3), Vector::new(1.0, 1.0), None);
        for _ in 0..1_000 {
            obstacle.simulate();
        }
        assert!(!obstacle.is_expired());
    }

    #[test]
    fn message_radius_grows_linearly() {
        let mut message = Message::new(EntityId(2), Vector::ZERO, 'A', LifeletId(0), 6.0, 20);
        assert_eq!(message.radius(), 0.0);
        assert!(!message.is_audible_from(Vector::new(90.0, 0.0), 40.0));
        for _ in 0..10 {
            message.simulate();
        }
        assert!((message.radius() - 60.0).abs() < 1e-9);
        assert!(message.is_audible_from(Vector::new(90.0, 0.0), 40.0));
    }

    #[test]
    fn message_draws_fading_ring_and_character() {
        let message = Message::new(EntityId(4), Vector::ZERO, 'Z', LifeletId(1), 6.0, 20);
        let mut surface = RecordingSurface::new();
        message.draw(&mut surface);
        assert_eq!(surface.commands().len(), 2);
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["Z"]);
    }
}
