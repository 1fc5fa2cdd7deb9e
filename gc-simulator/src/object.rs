//! Simulated heap objects

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sequential object identifier, never reused within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A simulated object: identity plus outgoing links
///
/// Links are plain ids. The collector never follows them, so cycles and
/// self references are harmless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulatedObject {
    id: ObjectId,
    refs: Vec<ObjectId>,
}

impl SimulatedObject {
    /// Create an object with no links
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            refs: Vec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Outgoing links in insertion order
    pub fn refs(&self) -> &[ObjectId] {
        &self.refs
    }

    /// Append a link to another object
    pub fn link(&mut self, target: ObjectId) {
        self.refs.push(target);
    }
}
