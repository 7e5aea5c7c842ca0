use std::collections::HashMap;

use indexmap::IndexMap;
use utility::id::Id;

use crate::{
    location::{Location, LocationWithRelations},
    WithId,
};

/// A flat view of the location tree.
///
/// Locations are kept in a keyed collection, relations are answered through an
/// index from parent id to child ids. Nothing holds a reference to another
/// location, so a tree is cheap to rebuild from a fresh database read.
#[derive(Debug, Clone, Default)]
pub struct LocationTree {
    // Index map preserves the order in which the locations were read, which
    // usually is the ordering done at database level.
    locations: IndexMap<Id<Location>, Location>,
    children: HashMap<Id<Location>, Vec<Id<Location>>>,
}

impl LocationTree {
    pub fn new(locations: Vec<WithId<Location>>) -> Self {
        let mut tree = Self::default();
        for location in locations {
            tree.insert(location);
        }
        tree
    }

    fn insert(&mut self, location: WithId<Location>) {
        if let Some(parent_id) = location.content.parent_id {
            self.children.entry(parent_id).or_default().push(location.id);
        }
        self.locations.insert(location.id, location.content);
    }

    pub fn get(&self, id: &Id<Location>) -> Option<WithId<Location>> {
        self.locations
            .get(id)
            .map(|location| WithId::new(*id, location.clone()))
    }

    /// Returns `None` for root locations and for locations whose parent does
    /// not exist (anymore).
    pub fn parent_of(&self, id: &Id<Location>) -> Option<WithId<Location>> {
        self.locations
            .get(id)
            .and_then(|location| location.parent_id)
            .and_then(|parent_id| self.get(&parent_id))
    }

    pub fn children_of(&self, id: &Id<Location>) -> Vec<WithId<Location>> {
        self.children
            .get(id)
            .map(|children| {
                children
                    .iter()
                    .filter_map(|child_id| self.get(child_id))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }

    /// Resolves parent and children of every location, one level deep.
    pub fn with_relations(&self) -> Vec<LocationWithRelations> {
        self.locations
            .keys()
            .filter_map(|id| {
                self.get(id).map(|location| LocationWithRelations {
                    parent: self.parent_of(id),
                    children: self.children_of(id),
                    location,
                })
            })
            .collect()
    }
}
