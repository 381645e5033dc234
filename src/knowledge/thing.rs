//! A file that matched a search in some earlier run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::vertex::vertex_key;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thing {
    pub filename: String,
    /// In-file patterns that matched this file, with when they last did
    #[serde(default)]
    pub patterns_seen: BTreeMap<String, DateTime<Utc>>,
    /// Concrete strings captured inside this file, with when they were last seen
    #[serde(default)]
    pub captured_strings: BTreeMap<String, DateTime<Utc>>,
    /// Names of the directories this file was found in
    #[serde(default)]
    pub vertex_names: Vec<String>,
}

impl Thing {
    pub fn new(filename: impl Into<String>, vertex_name: &str) -> Self {
        Self {
            filename: filename.into(),
            patterns_seen: BTreeMap::new(),
            captured_strings: BTreeMap::new(),
            vertex_names: vec![vertex_name.to_string()],
        }
    }

    /// Merge a new observation. Re-seen patterns and captures get `now` as
    /// their timestamp.
    pub fn observe(
        &mut self,
        patterns: &[String],
        captures: &[String],
        vertex_name: &str,
        now: DateTime<Utc>,
    ) {
        for pattern in patterns {
            self.patterns_seen.insert(pattern.clone(), now);
        }
        for capture in captures {
            self.captured_strings.insert(capture.clone(), now);
        }
        if !self
            .vertex_names
            .iter()
            .any(|name| vertex_key(name) == vertex_key(vertex_name))
        {
            self.vertex_names.push(vertex_name.to_string());
        }
    }
}
