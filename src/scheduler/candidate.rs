//! Traversal candidates and their ordering in the live queue.

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// Stable identity of a directory, derived from its path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(u64);

impl CandidateId {
    pub fn for_path(path: &Path) -> Self {
        let mut hasher = DefaultHasher::new();
        path.hash(&mut hasher);
        Self(hasher.finish())
    }
}

/// Name a directory goes by in the graph. The filesystem root has no final
/// component, so it goes by its full display form.
pub fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// A directory waiting to be visited.
///
/// Lifecycle: staged (score may still grow) -> queued -> visited.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: CandidateId,
    pub path: PathBuf,
    /// Key of the vertex this directory's name maps to
    pub vertex: String,
    pub score: f64,
    pub visited: bool,
    /// The search root always pops before anything else
    pub is_root: bool,
}

impl Candidate {
    pub fn new(path: PathBuf, vertex: String, score: f64) -> Self {
        Self {
            id: CandidateId::for_path(&path),
            path,
            vertex,
            score,
            visited: false,
            is_root: false,
        }
    }

    pub fn name(&self) -> String {
        directory_name(&self.path)
    }
}

/// Heap slot. Max-heap order: root first, then higher score, then earlier push.
#[derive(Debug)]
pub(super) struct QueueEntry {
    pub candidate: Candidate,
    pub seq: u64,
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.candidate
            .is_root
            .cmp(&other.candidate.is_root)
            .then_with(|| self.candidate.score.total_cmp(&other.candidate.score))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueEntry {}
