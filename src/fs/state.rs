//! Loading and saving the knowledge store.
//!
//! The store is JSON, compressed with raw snappy by default. Missing or
//! unreadable state is never an error: the run starts from an empty store.

use anyhow::{Context, Result};
use snap::raw::{Decoder, Encoder};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

use super::locking::{locked_read_bytes, locked_write_bytes};
use crate::knowledge::KnowledgeStore;

pub const COMPRESSED_STATE_FILE: &str = "state_v2.json.sz";
pub const PLAIN_STATE_FILE: &str = "state_v2.json";

/// Location and format of the persisted store
#[derive(Debug, Clone)]
pub struct StateFile {
    dir: PathBuf,
    /// Write plain JSON instead of the compressed form
    plain: bool,
}

impl StateFile {
    pub fn new(dir: impl Into<PathBuf>, plain: bool) -> Self {
        Self {
            dir: dir.into(),
            plain,
        }
    }

    pub fn compressed_path(&self) -> PathBuf {
        self.dir.join(COMPRESSED_STATE_FILE)
    }

    pub fn plain_path(&self) -> PathBuf {
        self.dir.join(PLAIN_STATE_FILE)
    }

    /// Where `save` writes
    pub fn target_path(&self) -> PathBuf {
        if self.plain {
            self.plain_path()
        } else {
            self.compressed_path()
        }
    }

    /// Load the store, preferring the compressed file. Anything missing or
    /// corrupt yields an empty store.
    pub fn load(&self) -> KnowledgeStore {
        for (path, compressed) in [(self.compressed_path(), true), (self.plain_path(), false)] {
            if !path.exists() {
                continue;
            }
            match read_store(&path, compressed) {
                Ok(store) => {
                    info!(
                        path = %path.display(),
                        vertices = store.vertices.len(),
                        things = store.things.len(),
                        "loaded state"
                    );
                    return store;
                }
                Err(err) => {
                    warn!("ignoring unreadable state: {err:#}");
                }
            }
        }
        KnowledgeStore::default()
    }

    /// Start loading on a worker thread; join before the scan begins
    pub fn load_in_background(&self) -> JoinHandle<KnowledgeStore> {
        let state = self.clone();
        thread::spawn(move || state.load())
    }

    /// Persist the store in the configured format and remove the file of
    /// the other format so a stale copy is never loaded later.
    pub fn save(&self, store: &KnowledgeStore) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create state directory: {}", self.dir.display()))?;

        let json = serde_json::to_vec(store).context("Failed to serialize knowledge store")?;
        let (path, stale, bytes) = if self.plain {
            (self.plain_path(), self.compressed_path(), json)
        } else {
            let compressed = Encoder::new()
                .compress_vec(&json)
                .context("Failed to compress knowledge store")?;
            (self.compressed_path(), self.plain_path(), compressed)
        };

        locked_write_bytes(&path, &bytes)?;
        if stale.exists() {
            fs::remove_file(&stale)
                .with_context(|| format!("Failed to remove stale state: {}", stale.display()))?;
        }

        info!(path = %path.display(), bytes = bytes.len(), "saved state");
        Ok(path)
    }
}

fn read_store(path: &Path, compressed: bool) -> Result<KnowledgeStore> {
    let bytes = locked_read_bytes(path)?;
    let json = if compressed {
        Decoder::new()
            .decompress_vec(&bytes)
            .with_context(|| format!("Failed to decompress {}", path.display()))?
    } else {
        bytes
    };
    serde_json::from_slice(&json).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn sample_store() -> KnowledgeStore {
        let mut store = KnowledgeStore::default();
        store.resolve_vertex("repo", Path::new("/repo"));
        store.resolve_vertex("src", Path::new("/repo/src"));
        store.record_adjacency("src", &["repo".to_string()]);
        store.upsert_thing("main.txt", &["*.txt".to_string()], &[], &[], "src");
        store
    }

    #[test]
    fn test_missing_state_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = StateFile::new(temp.path(), false).load();
        assert!(store.vertices.is_empty());
        assert!(store.things.is_empty());
    }

    #[test]
    fn test_compressed_round_trip() {
        let temp = TempDir::new().unwrap();
        let state = StateFile::new(temp.path().join("nested"), false);

        let path = state.save(&sample_store()).unwrap();
        assert!(path.ends_with(COMPRESSED_STATE_FILE));

        let raw = fs::read(&path).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&raw).is_err());

        let loaded = state.load();
        assert_eq!(loaded.vertices.len(), 2);
        assert!(loaded.vertex("src").unwrap().adjacents["repo"]
            .offsets
            .contains(&1));
        assert_eq!(loaded.pattern_index["*.txt"], vec!["main.txt"]);
    }

    #[test]
    fn test_plain_json_is_readable_and_replaces_compressed() {
        let temp = TempDir::new().unwrap();
        StateFile::new(temp.path(), false)
            .save(&sample_store())
            .unwrap();

        let plain = StateFile::new(temp.path(), true);
        let path = plain.save(&sample_store()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"vertices\""));
        assert!(!temp.path().join(COMPRESSED_STATE_FILE).exists());
        assert_eq!(plain.load().vertices.len(), 2);
    }

    #[test]
    fn test_corrupt_state_falls_back_to_empty() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(COMPRESSED_STATE_FILE), b"not snappy at all").unwrap();
        fs::write(temp.path().join(PLAIN_STATE_FILE), b"{ truncated").unwrap();

        let store = StateFile::new(temp.path(), false).load();
        assert!(store.vertices.is_empty());
    }

    #[test]
    fn test_corrupt_compressed_falls_back_to_plain() {
        let temp = TempDir::new().unwrap();
        StateFile::new(temp.path(), true)
            .save(&sample_store())
            .unwrap();
        fs::write(temp.path().join(COMPRESSED_STATE_FILE), b"garbage").unwrap();

        let store = StateFile::new(temp.path(), false).load();
        assert_eq!(store.vertices.len(), 2);
    }

    #[test]
    fn test_background_load_returns_store() {
        let temp = TempDir::new().unwrap();
        let state = StateFile::new(temp.path(), false);
        state.save(&sample_store()).unwrap();

        let store = state.load_in_background().join().unwrap();
        assert!(store.thing("main.txt").is_some());
    }
}
