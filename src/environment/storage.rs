use std::hash::Hash;

use itertools::Itertools;

use super::types::{Article, Company, CompanyId, ItemId};

/// Anything that can live in a [`Normalized`] collection
pub trait Identified {
    type Id: Clone + Eq + Hash + std::fmt::Debug;
    /// Drafts that were never saved have no id yet
    fn identifier(&self) -> Option<&Self::Id>;
}

impl Identified for Article {
    type Id = ItemId;
    fn identifier(&self) -> Option<&ItemId> {
        Some(&self.id)
    }
}

impl Identified for Company {
    type Id = CompanyId;
    fn identifier(&self) -> Option<&CompanyId> {
        self.id.as_ref()
    }
}

/// Entities stored once by id, plus the ordered ids of the current list.
///
/// Every id in the ordered list is present in the map. The map itself may
/// hold more entries than the list references: `merge_page` keeps records
/// from earlier pages around so that going back to an earlier result
/// doesn't need a refetch. Use `replace_all` or `clear` to drop them.
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized<T: Identified + Clone> {
    ids: im::Vector<T::Id>,
    by_id: im::HashMap<T::Id, T>,
}

impl<T: Identified + Clone> Default for Normalized<T> {
    fn default() -> Self {
        Self {
            ids: im::Vector::new(),
            by_id: im::HashMap::new(),
        }
    }
}

impl<T: Identified + Clone> Normalized<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the ordered list with `items`, merging them into the map
    /// without pruning.
    pub fn merge_page(&mut self, items: impl IntoIterator<Item = T>) {
        let mut ids = Vec::new();
        for item in items {
            let Some(id) = item.identifier().cloned() else {
                log::warn!("Ignoring record without id");
                continue;
            };
            self.by_id.insert(id.clone(), item);
            ids.push(id);
        }
        self.ids = ids.into_iter().unique().collect();
    }

    /// Replace list and map. Nothing from before survives.
    pub fn replace_all(&mut self, items: impl IntoIterator<Item = T>) {
        self.by_id.clear();
        self.merge_page(items);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.by_id.clear();
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.by_id.get(id)
    }

    /// Apply `action` to the record for `id`. Returns whether it existed.
    pub fn mutate(&mut self, id: &T::Id, action: impl FnOnce(&mut T)) -> bool {
        match self.by_id.get_mut(id) {
            Some(item) => {
                action(item);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &T::Id> {
        self.ids.iter()
    }

    /// The records of the ordered list, in order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.ids.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of cached records no longer referenced by the list
    pub fn orphans(&self) -> usize {
        self.by_id.len() - self.ids.len()
    }
}
