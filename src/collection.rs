// 🗂️ Indexed Collection - keyed store shared by every entity list
//
// Insertion-ordered, keyed by entity id. Re-adding an id replaces the stored
// entity in place (last write wins, original position kept). Invalid entities
// are admitted; validity is queried, not enforced.

use crate::validation::Validate;
use std::collections::HashMap;
use tracing::{debug, warn};

/// A validated record with an identity of its own
pub trait Entity: Validate {
    fn id(&self) -> Option<&str>;

    /// Storage key; entities without an id share the empty key
    fn key(&self) -> &str {
        self.id().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct IndexedCollection<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T: Entity> IndexedCollection<T> {
    pub fn new() -> Self {
        IndexedCollection {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Admit an entity (or anything convertible into one)
    ///
    /// Returns the stored entity so callers can run post-admission hooks.
    pub fn add<E: Into<T>>(&mut self, item: E) -> &mut T {
        let item: T = item.into();

        let errors = item.errors();
        if !errors.is_empty() {
            debug!(kind = T::KIND, id = item.key(), errors = %errors, "admitting invalid entity");
        }

        let existing = self.index.get(item.key()).copied();
        let position = match existing {
            Some(position) => {
                warn!(kind = T::KIND, id = item.key(), "duplicate id, replacing earlier entry");
                self.items[position] = item;
                position
            }
            None => {
                let position = self.items.len();
                self.index.insert(item.key().to_string(), position);
                self.items.push(item);
                position
            }
        };

        &mut self.items[position]
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&position| &self.items[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Remove every entity matching the predicate; returns how many went
    pub fn delete_if<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        let removed = before - self.items.len();

        if removed > 0 {
            self.reindex();
        }

        removed
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.key())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn reindex(&mut self) {
        self.index = self
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| (item.key().to_string(), position))
            .collect();
    }
}

impl<T: Entity> Default for IndexedCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: Entity> IntoIterator for &'a IndexedCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Entity> FromIterator<T> for IndexedCollection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = IndexedCollection::new();
        for item in iter {
            collection.add(item);
        }
        collection
    }
}

// ============================================================================
// TESTS
// ============================================================================
