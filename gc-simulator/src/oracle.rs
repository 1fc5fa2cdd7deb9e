//! Strong-reference lookup used by collection cycles
//!
//! Reachability is a flat flag per object, supplied by whoever drives the
//! simulation. Nothing here walks object links.

use std::collections::{HashMap, HashSet};

use crate::object::ObjectId;

/// Answers whether an object is held from outside the heap
pub trait ReferenceOracle {
    /// True if `id` must survive the current cycle
    fn is_strongly_referenced(&self, id: ObjectId) -> bool;
}

impl ReferenceOracle for HashSet<ObjectId> {
    fn is_strongly_referenced(&self, id: ObjectId) -> bool {
        self.contains(&id)
    }
}

impl ReferenceOracle for HashMap<ObjectId, bool> {
    fn is_strongly_referenced(&self, id: ObjectId) -> bool {
        self.get(&id).copied().unwrap_or(false)
    }
}

/// Ordered set of externally referenced ids
///
/// Keeps insertion order in a side vector so the driver can pick a uniformly
/// random root in O(1) and runs stay reproducible under a fixed seed.
#[derive(Debug, Clone, Default)]
pub struct StrongReferenceSet {
    ids: Vec<ObjectId>,
    index: HashMap<ObjectId, usize>,
}

impl StrongReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `id` as strongly referenced. Returns false if it already was.
    pub fn insert(&mut self, id: ObjectId) -> bool {
        if self.index.contains_key(&id) {
            return false;
        }
        self.index.insert(id, self.ids.len());
        self.ids.push(id);
        true
    }

    /// Drop the strong reference to `id`. Returns false if there was none.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let Some(pos) = self.index.remove(&id) else {
            return false;
        };
        self.ids.swap_remove(pos);
        if let Some(moved) = self.ids.get(pos) {
            self.index.insert(*moved, pos);
        }
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Id at position `pos` of the internal ordering
    pub fn get(&self, pos: usize) -> Option<ObjectId> {
        self.ids.get(pos).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.ids.iter().copied()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
        self.index.clear();
    }
}

impl ReferenceOracle for StrongReferenceSet {
    fn is_strongly_referenced(&self, id: ObjectId) -> bool {
        self.contains(id)
    }
}

impl FromIterator<ObjectId> for StrongReferenceSet {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}
