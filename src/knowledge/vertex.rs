//! Graph vertex: everything learned about one directory name.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use super::edge::Edge;
use super::histogram::Histogram;

/// Normalized lookup key for a directory name. Names compare case-insensitively.
pub fn vertex_key(name: &str) -> String {
    name.to_lowercase()
}

/// One vertex per distinct directory name, shared by every directory in any
/// tree that carries that name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    pub name: String,
    /// Every absolute path where a directory with this name was discovered
    #[serde(default)]
    pub absolute_paths: BTreeSet<PathBuf>,
    #[serde(default)]
    pub visits: u64,
    /// Timestamps of past finds, oldest first
    #[serde(default)]
    pub last_finds: Vec<DateTime<Utc>>,
    #[serde(default, rename = "last_find_histogram")]
    pub last_find_count: Histogram,
    /// Edges keyed by the neighbor's vertex key
    #[serde(default)]
    pub adjacents: BTreeMap<String, Edge>,
    /// Adjacency observations made during this process only
    #[serde(skip)]
    pub adjacent_hits: u64,
}

impl Vertex {
    /// Create a vertex for a freshly discovered directory. Discovery counts as
    /// the first visit.
    pub fn new(name: impl Into<String>, path: Option<&Path>) -> Self {
        Self {
            name: name.into(),
            absolute_paths: path.map(Path::to_path_buf).into_iter().collect(),
            visits: 1,
            last_finds: Vec::new(),
            last_find_count: Histogram::default(),
            adjacents: BTreeMap::new(),
            adjacent_hits: 0,
        }
    }

    pub fn key(&self) -> String {
        vertex_key(&self.name)
    }

    /// Remember a location for this name; returns true if it was new
    pub fn observe_path(&mut self, path: &Path) -> bool {
        if self.absolute_paths.contains(path) {
            return false;
        }
        self.absolute_paths.insert(path.to_path_buf())
    }

    pub fn record_find(&mut self, at: DateTime<Utc>) {
        self.last_finds.push(at);
    }

    pub fn find_count(&self) -> usize {
        self.last_finds.len()
    }

    pub fn last_find(&self) -> Option<DateTime<Utc>> {
        self.last_finds.last().copied()
    }

    /// Record that `neighbor` sits `offset` levels away from this vertex
    pub fn link(&mut self, neighbor_key: &str, neighbor_name: &str, offset: i32) {
        self.adjacent_hits += 1;
        self.adjacents
            .entry(neighbor_key.to_string())
            .and_modify(|edge| {
                edge.observe(offset);
            })
            .or_insert_with(|| Edge::new(neighbor_name, offset));
    }

    /// Retention rank used by eviction.
    ///
    /// `find batches * (1 / whole days since last find) * visits`, where a find
    /// earlier today counts as one day. Vertices that never produced a find
    /// rank by visits alone.
    pub fn rank(&self, now: DateTime<Utc>) -> f64 {
        let Some(last) = self.last_find() else {
            return self.visits as f64;
        };
        if self.last_find_count.is_empty() {
            return self.visits as f64;
        }
        let days = (now - last).num_days().max(1) as f64;
        self.last_find_count.bucket_count() as f64 * (1.0 / days) * self.visits as f64
    }
}
