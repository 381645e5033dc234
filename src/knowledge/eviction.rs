//! Bounding the size of the persisted graph.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, info};

use super::{vertex_key, KnowledgeStore};

/// Vertex count at which eviction starts trimming the graph
pub const DEFAULT_VERTEX_CEILING: usize = 100_000;

impl KnowledgeStore {
    /// Trim the graph to at most `ceiling` vertices. Returns how many were dropped.
    pub fn evict(&mut self, ceiling: usize) -> usize {
        self.evict_at(ceiling, Utc::now())
    }

    /// Keep the `ceiling` highest-ranked vertices as of `now`.
    ///
    /// Ties keep map order. Edges pointing at dropped vertices go with them,
    /// as do thing references to them. Things left without a directory are
    /// forgotten and removed from the pattern index.
    pub fn evict_at(&mut self, ceiling: usize, now: DateTime<Utc>) -> usize {
        if self.vertices.len() < ceiling {
            return 0;
        }

        let mut ranked: Vec<(&String, f64)> = self
            .vertices
            .iter()
            .map(|(key, vertex)| (key, vertex.rank(now)))
            .collect();
        // sort_by is stable, so equal ranks stay in map order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let keep: HashSet<String> = ranked
            .into_iter()
            .take(ceiling)
            .map(|(key, _)| key.clone())
            .collect();

        let before = self.vertices.len();
        self.vertices.retain(|key, _| keep.contains(key));
        for vertex in self.vertices.values_mut() {
            vertex.adjacents.retain(|key, _| keep.contains(key));
        }

        self.forget_orphaned_things(&keep);

        let dropped = before - self.vertices.len();
        if dropped > 0 {
            info!(dropped, kept = self.vertices.len(), "evicted low-rank vertices");
        }
        dropped
    }

    fn forget_orphaned_things(&mut self, keep: &HashSet<String>) {
        for thing in self.things.values_mut() {
            thing
                .vertex_names
                .retain(|name| keep.contains(&vertex_key(name)));
        }

        let orphaned: HashSet<String> = self
            .things
            .iter()
            .filter(|(_, thing)| thing.vertex_names.is_empty())
            .map(|(key, _)| key.clone())
            .collect();
        if orphaned.is_empty() {
            return;
        }

        self.things.retain(|key, _| !orphaned.contains(key));
        for filenames in self.pattern_index.values_mut() {
            filenames.retain(|filename| !orphaned.contains(&filename.to_lowercase()));
        }
        self.pattern_index.retain(|_, filenames| !filenames.is_empty());
        debug!(things = orphaned.len(), "forgot files in evicted directories");
    }
}
