//! Ordered collection that tolerates structural changes while it is being walked.
//!
//! Items added or removed during a traversal are parked in pending buffers and
//! applied, adds first and removes second, once the outermost traversal ends.
//! Traversals only ever see committed items, so indices handed out by
//! [`LoopList::begin_traversal`] stay valid until the matching
//! [`LoopList::end_traversal`].

use std::fmt::Debug;

/// Gives items a stable identity that survives reordering.
pub trait Keyed {
    type Key: Copy + Eq + Debug;

    fn key(&self) -> Self::Key;
}

/// Deferred-mutation list backing every world collection.
#[derive(Debug, Clone)]
pub struct LoopList<T: Keyed> {
    items: Vec<T>,
    staging: Staging<T>,
    depth: usize,
}

/// Buffered structural changes recorded during a traversal.
#[derive(Debug, Clone)]
pub struct Staging<T: Keyed> {
    added: Vec<T>,
    removed: Vec<T::Key>,
}

impl<T: Keyed> Default for Staging<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T: Keyed> Staging<T> {
    /// Queue an item for insertion once the traversal finishes.
    pub fn add(&mut self, item: T) {
        self.added.push(item);
    }

    /// Queue a key for removal once the traversal finishes.
    pub fn remove(&mut self, key: T::Key) {
        if !self.removed.contains(&key) {
            self.removed.push(key);
        }
    }

    #[must_use]
    pub fn is_removing(&self, key: T::Key) -> bool {
        self.removed.contains(&key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

impl<T: Keyed> Default for LoopList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            staging: Staging::default(),
            depth: 0,
        }
    }
}

impl<T: Keyed> LoopList<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item, or park it until the running traversal ends.
    pub fn add(&mut self, item: T) {
        if self.depth > 0 {
            self.staging.add(item);
        } else {
            self.items.push(item);
        }
    }

    /// Remove the item with `key`.
    ///
    /// Outside a traversal the item is dropped immediately and the return value
    /// says whether it was found. During a traversal the removal is parked and
    /// the return value says whether the key is committed or pending insertion.
    pub fn remove(&mut self, key: T::Key) -> bool {
        if self.depth > 0 {
            let known = self.contains(key) || self.staging.added.iter().any(|i| i.key() == key);
            if known {
                self.staging.remove(key);
            }
            return known;
        }
        match self.index_of(key) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drop every committed and pending item.
    pub fn clear(&mut self) {
        if self.depth > 0 {
            let keys: Vec<T::Key> = self.items.iter().map(Keyed::key).collect();
            self.staging.added.clear();
            for key in keys {
                self.staging.remove(key);
            }
        } else {
            self.items.clear();
            self.staging = Staging::default();
        }
    }

    /// Open a traversal and return the number of committed items it covers.
    ///
    /// Nested calls share the snapshot of the outermost one.
    pub fn begin_traversal(&mut self) -> usize {
        if self.depth == 0 {
            self.sync();
        }
        self.depth += 1;
        self.items.len()
    }

    /// Close a traversal; the outermost close applies pending changes.
    pub fn end_traversal(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 {
            self.sync();
        }
    }

    /// Visit every committed item with mutable access plus a staging handle for
    /// deferred adds and removes.
    pub fn traverse<F>(&mut self, mut visitor: F)
    where
        F: FnMut(&mut T, &mut Staging<T>),
    {
        self.begin_traversal();
        let Self { items, staging, .. } = &mut *self;
        for item in items.iter_mut() {
            visitor(item, staging);
        }
        self.end_traversal();
    }

    /// Apply pending changes unless a traversal is open. Returns whether
    /// anything changed.
    pub fn sync(&mut self) -> bool {
        if self.depth > 0 || self.staging.is_empty() {
            return false;
        }
        let Staging { added, removed } = std::mem::take(&mut self.staging);
        self.items.extend(added);
        if !removed.is_empty() {
            self.items.retain(|item| !removed.contains(&item.key()));
        }
        true
    }

    #[must_use]
    pub fn is_traversing(&self) -> bool {
        self.depth > 0
    }

    /// Whether a removal of `key` is parked for the end of the traversal.
    #[must_use]
    pub fn is_pending_removal(&self, key: T::Key) -> bool {
        self.staging.is_removing(key)
    }

    #[must_use]
    pub fn pending_additions(&self) -> usize {
        self.staging.added.len()
    }

    /// Committed items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Committed items with in-place mutable access; structure cannot change.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub fn find(&self, key: T::Key) -> Option<&T> {
        self.items.iter().find(|item| item.key() == key)
    }

    pub fn find_mut(&mut self, key: T::Key) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.key() == key)
    }

    #[must_use]
    pub fn index_of(&self, key: T::Key) -> Option<usize> {
        self.items.iter().position(|item| item.key() == key)
    }

    #[must_use]
    pub fn contains(&self, key: T::Key) -> bool {
        self.index_of(key).is_some()
    }

    /// Number of committed items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T: Keyed> IntoIterator for &'a LoopList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Keyed> FromIterator<T> for LoopList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}
