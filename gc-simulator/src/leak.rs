//! Leak tracker
//!
//! A registry of objects that, in a real system, something outside the heap
//! would still hold. It observes leaks; it does not keep objects alive. A
//! leaked object is collected out of its generation like any other, and its
//! entry here stays for the rest of the run.

use std::collections::BTreeMap;

use crate::generational::GenerationalHeap;
use crate::object::{ObjectId, SimulatedObject};

#[derive(Debug, Clone, Default)]
pub struct LeakTracker {
    leaked: BTreeMap<ObjectId, SimulatedObject>,
}

impl LeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `object` under `id`. Re-marking is a no-op that returns false.
    pub fn mark_leaked(&mut self, id: ObjectId, object: SimulatedObject) -> bool {
        if self.leaked.contains_key(&id) {
            return false;
        }
        self.leaked.insert(id, object);
        true
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.leaked.contains_key(&id)
    }

    pub fn get(&self, id: ObjectId) -> Option<&SimulatedObject> {
        self.leaked.get(&id)
    }

    pub fn len(&self) -> usize {
        self.leaked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaked.is_empty()
    }

    /// Leaked ids in ascending order
    pub fn ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.leaked.keys().copied()
    }

    /// Leaked objects that no generation holds any more
    pub fn detached(&self, heap: &GenerationalHeap) -> Vec<ObjectId> {
        self.ids()
            .filter(|id| heap.generation_of(*id).is_none())
            .collect()
    }

    /// Only used when a whole run restarts
    pub(crate) fn clear(&mut self) {
        self.leaked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generational::Generation;

    #[test]
    fn test_mark_is_idempotent() {
        let mut tracker = LeakTracker::new();
        let obj = SimulatedObject::new(ObjectId(3));

        assert!(tracker.mark_leaked(ObjectId(3), obj.clone()));
        assert!(!tracker.mark_leaked(ObjectId(3), obj));
        assert_eq!(tracker.len(), 1);
        assert!(tracker.contains(ObjectId(3)));
    }

    #[test]
    fn test_keeps_snapshot_of_links() {
        let mut tracker = LeakTracker::new();
        let mut obj = SimulatedObject::new(ObjectId(8));
        obj.link(ObjectId(1));
        tracker.mark_leaked(ObjectId(8), obj);

        assert_eq!(tracker.get(ObjectId(8)).unwrap().refs(), &[ObjectId(1)]);
    }

    #[test]
    fn test_detached_lists_only_missing_objects() {
        let mut heap = GenerationalHeap::new();
        heap.insert(Generation::Old, SimulatedObject::new(ObjectId(1)));

        let mut tracker = LeakTracker::new();
        tracker.mark_leaked(ObjectId(1), SimulatedObject::new(ObjectId(1)));
        tracker.mark_leaked(ObjectId(2), SimulatedObject::new(ObjectId(2)));

        assert_eq!(tracker.detached(&heap), vec![ObjectId(2)]);
    }
}
