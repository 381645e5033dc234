//! Per-run metrics kept in the search history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::settings::SearchSettings;

/// Number of extensions kept in `scan_size_by_extension` once a run is archived
pub const TOP_EXTENSIONS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetrics {
    #[serde(default)]
    pub file_count: u64,
    #[serde(default)]
    pub directory_count: u64,
    /// Files whose name passed the filter
    #[serde(default)]
    pub file_match_count: u64,
    /// Files whose contents matched every content pattern
    #[serde(default)]
    pub file_match_inside_count: u64,
    #[serde(default)]
    pub match_row_count: u64,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub total_bytes_scanned: u64,
    #[serde(default)]
    pub scan_size_by_extension: BTreeMap<String, u64>,
    #[serde(skip)]
    pub excluded_binaries: BTreeMap<String, u64>,
    pub search_date: DateTime<Utc>,
    #[serde(default)]
    pub settings: SearchSettings,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub args: String,
}

impl RunMetrics {
    pub fn new(settings: SearchSettings, args: impl Into<String>) -> Self {
        Self {
            file_count: 0,
            directory_count: 0,
            file_match_count: 0,
            file_match_inside_count: 0,
            match_row_count: 0,
            duration_ms: 0,
            total_bytes_scanned: 0,
            scan_size_by_extension: BTreeMap::new(),
            excluded_binaries: BTreeMap::new(),
            search_date: Utc::now(),
            settings,
            is_complete: false,
            args: args.into(),
        }
    }

    pub fn record_scanned(&mut self, extension: &str, bytes: u64) {
        self.total_bytes_scanned += bytes;
        *self
            .scan_size_by_extension
            .entry(extension.to_string())
            .or_insert(0) += bytes;
    }

    pub fn record_excluded(&mut self, extension: &str, bytes: u64) {
        *self
            .excluded_binaries
            .entry(extension.to_string())
            .or_insert(0) += bytes;
    }

    /// Extensions ordered by bytes scanned, largest first
    pub fn top_extensions(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut sizes: Vec<(&str, u64)> = self
            .scan_size_by_extension
            .iter()
            .map(|(ext, bytes)| (ext.as_str(), *bytes))
            .collect();
        sizes.sort_by(|a, b| b.1.cmp(&a.1));
        sizes.truncate(limit);
        sizes
    }

    /// Shrink the record before it goes into the persisted history
    pub fn clean(&mut self) {
        self.excluded_binaries.clear();
        let keep: BTreeMap<String, u64> = self
            .top_extensions(TOP_EXTENSIONS)
            .into_iter()
            .map(|(ext, bytes)| (ext.to_string(), bytes))
            .collect();
        self.scan_size_by_extension = keep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_keeps_top_extensions() {
        let mut metrics = RunMetrics::new(SearchSettings::default(), "");
        for (i, ext) in ["rs", "md", "txt", "toml", "json", "yaml", "lock"]
            .iter()
            .enumerate()
        {
            metrics.record_scanned(ext, (i as u64 + 1) * 100);
        }
        metrics.record_excluded("png", 4096);

        metrics.clean();

        assert_eq!(metrics.scan_size_by_extension.len(), TOP_EXTENSIONS);
        assert!(metrics.scan_size_by_extension.contains_key("lock"));
        assert!(!metrics.scan_size_by_extension.contains_key("rs"));
        assert!(metrics.excluded_binaries.is_empty());
        assert_eq!(metrics.total_bytes_scanned, 2800);
    }
}
