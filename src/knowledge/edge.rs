//! Adjacency between two directory names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Relationship from one vertex to a neighbor, with every signed depth offset
/// at which the pair has been seen. Positive offsets point up the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Display name of the neighbor vertex
    pub neighbor: String,
    #[serde(default)]
    pub offsets: BTreeSet<i32>,
}

impl Edge {
    pub fn new(neighbor: impl Into<String>, offset: i32) -> Self {
        Self {
            neighbor: neighbor.into(),
            offsets: BTreeSet::from([offset]),
        }
    }

    /// Record an offset; returns false if it was already known
    pub fn observe(&mut self, offset: i32) -> bool {
        self.offsets.insert(offset)
    }

    /// Smallest observed distance, ignoring direction
    pub fn closest_offset(&self) -> Option<u32> {
        self.offsets.iter().map(|o| o.unsigned_abs()).min()
    }
}
