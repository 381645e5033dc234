//! Adjacency maintenance between directory names.

use super::vertex::vertex_key;
use super::KnowledgeStore;

impl KnowledgeStore {
    /// Link a newly discovered directory name to its ancestors.
    ///
    /// `ancestors` runs from the nearest ancestor (the parent) outward to the
    /// search root. Each ancestor that is a known vertex gets a bidirectional
    /// edge: `+distance` from the new vertex up to the ancestor and
    /// `-distance` back down.
    pub fn record_adjacency(&mut self, name: &str, ancestors: &[String]) {
        let key = vertex_key(name);
        let Some(display) = self.vertices.get(&key).map(|v| v.name.clone()) else {
            return;
        };

        for (index, ancestor) in ancestors.iter().enumerate() {
            let distance = index as i32 + 1;
            let ancestor_key = vertex_key(ancestor);
            let Some(ancestor_display) = self.vertices.get(&ancestor_key).map(|v| v.name.clone())
            else {
                continue;
            };

            if let Some(vertex) = self.vertices.get_mut(&key) {
                vertex.link(&ancestor_key, &ancestor_display, distance);
            }
            if let Some(vertex) = self.vertices.get_mut(&ancestor_key) {
                vertex.link(&key, &display, -distance);
            }
        }
    }
}
