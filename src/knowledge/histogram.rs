//! Distribution of how many finds a single directory visit produced.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Maps "finds in one visit" to "number of visits that produced that many".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Histogram(BTreeMap<u64, u64>);

impl Histogram {
    /// Record one visit that produced `finds` matches
    pub fn record(&mut self, finds: u64) {
        *self.0.entry(finds).or_insert(0) += 1;
    }

    /// Number of visits recorded for a given find count
    pub fn get(&self, finds: u64) -> u64 {
        self.0.get(&finds).copied().unwrap_or(0)
    }

    /// Number of distinct find counts observed
    pub fn bucket_count(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Weighted find total divided by the number of distinct buckets.
    ///
    /// Returns `None` for an empty histogram.
    pub fn average(&self) -> Option<f64> {
        if self.0.is_empty() {
            return None;
        }
        let weighted: u64 = self.0.iter().map(|(finds, visits)| finds * visits).sum();
        Some(weighted as f64 / self.0.len() as f64)
    }
}
