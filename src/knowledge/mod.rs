//! Persistent knowledge gathered across runs.
//!
//! The store is an arena of vertices addressed by directory name. Adjacency
//! lives on each vertex as name-keyed edges, so the reciprocal references
//! between names never form ownership cycles.

pub mod edge;
mod eviction;
mod graph;
pub mod histogram;
pub mod metrics;
pub mod thing;
pub mod vertex;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub use edge::Edge;
pub use eviction::DEFAULT_VERTEX_CEILING;
pub use histogram::Histogram;
pub use metrics::RunMetrics;
pub use thing::Thing;
pub use vertex::{vertex_key, Vertex};

/// Everything scout remembers between runs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeStore {
    /// Previously matched files, keyed case-insensitively by file name
    #[serde(default)]
    pub things: BTreeMap<String, Thing>,
    /// Directory-name vertices, keyed by [`vertex_key`]
    #[serde(default)]
    pub vertices: BTreeMap<String, Vertex>,
    /// Filename pattern text -> file names it matched
    #[serde(default)]
    pub pattern_index: BTreeMap<String, Vec<String>>,
    /// Search root -> metrics of past runs, oldest first
    #[serde(default)]
    pub search_history: BTreeMap<String, Vec<RunMetrics>>,
}

impl KnowledgeStore {
    pub fn vertex(&self, name: &str) -> Option<&Vertex> {
        self.vertices.get(&vertex_key(name))
    }

    pub fn vertex_mut(&mut self, name: &str) -> Option<&mut Vertex> {
        self.vertices.get_mut(&vertex_key(name))
    }

    /// Find or create the vertex for a directory and remember its location.
    /// Returns the vertex key.
    pub fn resolve_vertex(&mut self, name: &str, path: &Path) -> String {
        let key = vertex_key(name);
        self.vertices
            .entry(key.clone())
            .and_modify(|vertex| {
                vertex.observe_path(path);
            })
            .or_insert_with(|| Vertex::new(name, Some(path)));
        key
    }

    pub fn thing(&self, filename: &str) -> Option<&Thing> {
        self.things.get(&filename.to_lowercase())
    }

    /// Record that `filename` matched, found in the directory named `vertex_name`.
    pub fn upsert_thing(
        &mut self,
        filename: &str,
        positive_patterns: &[String],
        in_file_patterns: &[String],
        captured_strings: &[String],
        vertex_name: &str,
    ) {
        self.upsert_thing_at(
            filename,
            positive_patterns,
            in_file_patterns,
            captured_strings,
            vertex_name,
            Utc::now(),
        );
    }

    pub fn upsert_thing_at(
        &mut self,
        filename: &str,
        positive_patterns: &[String],
        in_file_patterns: &[String],
        captured_strings: &[String],
        vertex_name: &str,
        now: DateTime<Utc>,
    ) {
        let key = filename.to_lowercase();
        self.things
            .entry(key.clone())
            .or_insert_with(|| Thing::new(filename, vertex_name))
            .observe(in_file_patterns, captured_strings, vertex_name, now);

        for pattern in positive_patterns {
            let filenames = self.pattern_index.entry(pattern.clone()).or_default();
            if !filenames.iter().any(|known| known.to_lowercase() == key) {
                filenames.push(filename.to_string());
            }
        }
    }

    /// Append a finished run to the history of `root`
    pub fn record_run(&mut self, root: &Path, mut metrics: RunMetrics) {
        metrics.clean();
        self.search_history
            .entry(root.display().to_string())
            .or_default()
            .push(metrics);
    }

    pub fn history(&self, root: &Path) -> &[RunMetrics] {
        self.search_history
            .get(&root.display().to_string())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
