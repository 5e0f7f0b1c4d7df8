use crate::lifelet::Behavior;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Stable index of a race inside its registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RaceId(pub usize);

type RaceSpawner = Box<dyn Fn(&mut dyn RngCore) -> Box<dyn Behavior> + Send + Sync>;

struct RaceEntry {
    name: Cow<'static, str>,
    author: Cow<'static, str>,
    spawner: RaceSpawner,
}

/// Ordered set of race factories the world spawns lifelets from.
#[derive(Default)]
pub struct RaceRegistry {
    entries: Vec<RaceEntry>,
}

impl std::fmt::Debug for RaceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaceRegistry")
            .field("races", &self.entries.iter().map(|e| e.name.as_ref()).collect::<Vec<_>>())
            .finish()
    }
}

impl RaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a race factory, returning its stable id.
    pub fn register<F>(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        author: impl Into<Cow<'static, str>>,
        factory: F,
    ) -> RaceId
    where
        F: Fn(&mut dyn RngCore) -> Box<dyn Behavior> + Send + Sync + 'static,
    {
        let id = RaceId(self.entries.len());
        self.entries.push(RaceEntry {
            name: name.into(),
            author: author.into(),
            spawner: Box::new(factory),
        });
        id
    }

    /// Instantiate a fresh behaviour for `race`.
    pub fn spawn(&self, rng: &mut dyn RngCore, race: RaceId) -> Option<Box<dyn Behavior>> {
        self.entries.get(race.0).map(|entry| (entry.spawner)(rng))
    }

    #[must_use]
    pub fn name(&self, race: RaceId) -> Option<&str> {
        self.entries.get(race.0).map(|entry| entry.name.as_ref())
    }

    #[must_use]
    pub fn author(&self, race: RaceId) -> Option<&str> {
        self.entries.get(race.0).map(|entry| entry.author.as_ref())
    }

    /// Look a race up by its (case-insensitive) name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<RaceId> {
        self.entries
            .iter()
            .position(|entry| entry.name.eq_ignore_ascii_case(name))
            .map(RaceId)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Race ids with their names, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (RaceId, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(index, entry)| (RaceId(index), entry.name.as_ref()))
    }

    /// New registry holding only the races accepted by `keep`, in the same order.
    #[must_use]
    pub fn retain<P>(mut self, mut keep: P) -> Self
    where
        P: FnMut(&str) -> bool,
    {
        self.entries.retain(|entry| keep(entry.name.as_ref()));
        self
    }
}
