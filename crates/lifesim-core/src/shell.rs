//! Tick-scoped read-only handles onto other lifelets.
//!
//! A [`Shell`] is stamped with the tick it was created in and shares the world's
//! [`TickClock`]. Once the world advances, every accessor fails with
//! [`LifeletError::ExpiredShell`] instead of returning stale data.

use crate::Tick;
use crate::config::SimulationConfig;
use crate::draw::Color;
use crate::error::LifeletError;
use crate::lifelet::{Lifelet, LifeletId};
use crate::math::Vector;
use crate::race::RaceId;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Shared view of the world's current tick.
#[derive(Debug, Clone, Default)]
pub struct TickClock(Arc<AtomicU64>);

impl TickClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Tick {
        Tick(self.0.load(Ordering::Acquire))
    }

    pub(crate) fn set(&self, tick: Tick) {
        self.0.store(tick.0, Ordering::Release);
    }
}

/// Live lifelet state a [`Shell`] resolves against on every read.
///
/// Implemented by [`World`](crate::World) and by
/// [`LifeletContext`](crate::LifeletContext), so race code passes its context.
pub trait LifeletLookup {
    /// The lifelet with `id`, dead or alive, if it is still in the world.
    fn lookup(&self, id: LifeletId) -> Option<&Lifelet>;

    fn settings(&self) -> &SimulationConfig;
}

/// Read-only, single-tick handle onto a lifelet.
///
/// The handle only stores identity. Vitals are read from the live world, so a
/// shell reflects damage or energy transfers made earlier in the same tick.
#[derive(Debug, Clone)]
pub struct Shell {
    target: LifeletId,
    race: RaceId,
    race_name: Arc<str>,
    stamped: Tick,
    clock: TickClock,
}

impl Shell {
    pub(crate) fn capture(lifelet: &Lifelet, race_name: Arc<str>, clock: &TickClock) -> Self {
        Self {
            target: lifelet.id(),
            race: lifelet.race(),
            race_name,
            stamped: clock.now(),
            clock: clock.clone(),
        }
    }

    fn check(&self) -> Result<(), LifeletError> {
        let current = self.clock.now();
        if current == self.stamped {
            Ok(())
        } else {
            Err(LifeletError::ExpiredShell {
                target: self.target,
                stamped: self.stamped,
                current,
            })
        }
    }

    /// The live target, after the tick check. Dead targets fail with
    /// [`LifeletError::TargetGone`].
    fn resolve<'v, V>(&self, view: &'v V) -> Result<&'v Lifelet, LifeletError>
    where
        V: LifeletLookup + ?Sized,
    {
        self.check()?;
        view.lookup(self.target)
            .filter(|lifelet| lifelet.is_alive())
            .ok_or(LifeletError::TargetGone {
                target: self.target,
            })
    }

    /// Whether the shell may still be read.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    /// Tick the shell was created in.
    #[must_use]
    pub fn stamped(&self) -> Tick {
        self.stamped
    }

    /// Target identity without the validity check, for world-side lookups.
    pub(crate) fn target(&self) -> LifeletId {
        self.target
    }

    pub fn id(&self) -> Result<LifeletId, LifeletError> {
        self.check().map(|()| self.target)
    }

    pub fn race(&self) -> Result<RaceId, LifeletError> {
        self.check().map(|()| self.race)
    }

    pub fn race_name(&self) -> Result<&str, LifeletError> {
        self.check()?;
        Ok(&self.race_name)
    }

    /// Whether the target is still alive right now.
    pub fn is_alive<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<bool, LifeletError> {
        self.check()?;
        Ok(view.lookup(self.target).is_some_and(Lifelet::is_alive))
    }

    pub fn position<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<Vector, LifeletError> {
        self.resolve(view).map(Lifelet::position)
    }

    pub fn velocity<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<Vector, LifeletError> {
        self.resolve(view).map(Lifelet::velocity)
    }

    pub fn energy<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<f64, LifeletError> {
        self.resolve(view).map(Lifelet::energy)
    }

    pub fn health<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<f64, LifeletError> {
        self.resolve(view).map(Lifelet::health)
    }

    pub fn visibility<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<f64, LifeletError> {
        self.resolve(view).map(|lifelet| lifelet.visibility(view.settings()))
    }

    pub fn color<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<Color, LifeletError> {
        self.resolve(view).map(Lifelet::color)
    }

    pub fn age<V: LifeletLookup + ?Sized>(&self, view: &V) -> Result<u64, LifeletError> {
        self.resolve(view).map(Lifelet::age)
    }

    /// Distance from the target to `point`.
    pub fn distance<V>(&self, view: &V, point: Vector) -> Result<f64, LifeletError>
    where
        V: LifeletLookup + ?Sized,
    {
        self.resolve(view).map(|lifelet| lifelet.distance(point))
    }

    /// Bearing of the target as seen from `point`.
    pub fn angle_from<V>(&self, view: &V, point: Vector) -> Result<f64, LifeletError>
    where
        V: LifeletLookup + ?Sized,
    {
        self.resolve(view)
            .map(|lifelet| lifelet.position().angle_between(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lone {
        lifelet: Lifelet,
        config: SimulationConfig,
    }

    impl LifeletLookup for Lone {
        fn lookup(&self, id: LifeletId) -> Option<&Lifelet> {
            (self.lifelet.id() == id).then_some(&self.lifelet)
        }

        fn settings(&self) -> &SimulationConfig {
            &self.config
        }
    }

    fn sample() -> (Shell, TickClock, Lone) {
        let config = SimulationConfig::default();
        let lifelet = Lifelet::new(
            LifeletId(3),
            RaceId(0),
            Vector::new(5.0, 0.0),
            Color::RED,
            &config,
            None,
        );
        let clock = TickClock::new();
        clock.set(Tick(10));
        let shell = Shell::capture(&lifelet, Arc::from("Test"), &clock);
        (shell, clock, Lone { lifelet, config })
    }

    #[test]
    fn readable_within_its_tick() {
        let (shell, _clock, view) = sample();
        assert_eq!(shell.id(), Ok(LifeletId(3)));
        assert_eq!(shell.race_name(), Ok("Test"));
        assert_eq!(shell.distance(&view, Vector::ZERO), Ok(5.0));
        assert_eq!(shell.visibility(&view), Ok(40.0));
        assert!(shell.is_valid());
    }

    #[test]
    fn reads_follow_the_live_lifelet() {
        let (shell, _clock, mut view) = sample();
        assert!(!view.lifelet.receive_damage(30.0, 0.001));
        assert_eq!(shell.health(&view), Ok(70.0));

        view.lifelet.mark_dead();
        assert_eq!(shell.is_alive(&view), Ok(false));
        assert_eq!(
            shell.health(&view),
            Err(LifeletError::TargetGone {
                target: LifeletId(3)
            })
        );
    }

    #[test]
    fn every_accessor_fails_after_the_tick_advances() {
        let (shell, clock, view) = sample();
        clock.set(Tick(11));
        let expected = LifeletError::ExpiredShell {
            target: LifeletId(3),
            stamped: Tick(10),
            current: Tick(11),
        };
        assert_eq!(shell.position(&view), Err(expected.clone()));
        assert_eq!(shell.id(), Err(expected.clone()));
        assert_eq!(shell.energy(&view), Err(expected.clone()));
        assert_eq!(shell.distance(&view, Vector::ZERO), Err(expected));
        assert!(!shell.is_valid());
        assert_eq!(shell.target(), LifeletId(3));
    }
}
