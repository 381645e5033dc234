//! Adaptive traversal scheduler: decides which directory to visit next.
//!
//! Candidates move through three places. New ones land in `staging`, where a
//! second sighting of the same directory adds to its score. `flush` pushes the
//! staging buffer into the `live` heap. Popped candidates go to `done`.
//! Duplicates in the heap are tolerated and discarded when popped.

mod candidate;
pub mod scoring;


use chrono::{DateTime, Utc};
use std::collections::{BinaryHeap, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::fs::accessor::DirEntryInfo;
use crate::knowledge::KnowledgeStore;
use crate::pattern::{ContentPattern, NameFilter};

use candidate::QueueEntry;
use scoring::{amplify, boost_recent, dampen, Scorer, INDEX_LOOKUP_SCORE};

pub use candidate::{directory_name, Candidate, CandidateId};

/// Priority queue of directories for one search root
#[derive(Debug)]
pub struct Scheduler {
    root: PathBuf,
    filter: NameFilter,
    content: Vec<ContentPattern>,
    done: HashMap<CandidateId, Candidate>,
    staging: HashMap<CandidateId, Candidate>,
    live: BinaryHeap<QueueEntry>,
    seq: u64,
}

impl Scheduler {
    pub fn new(root: impl Into<PathBuf>, filter: NameFilter, content: Vec<ContentPattern>) -> Self {
        Self {
            root: root.into(),
            filter,
            content,
            done: HashMap::new(),
            staging: HashMap::new(),
            live: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Seed from the pattern index and known files, then the root itself.
    pub fn initialize(&mut self, store: &mut KnowledgeStore) {
        self.initialize_at(store, Utc::now());
    }

    pub fn initialize_at(&mut self, store: &mut KnowledgeStore, now: DateTime<Utc>) {
        self.seed_from_index(store, now);
        self.seed_root(store);
        self.flush();
    }

    fn seed_from_index(&mut self, store: &KnowledgeStore, now: DateTime<Utc>) {
        for term in self.filter.positive_texts() {
            if let Some(filenames) = store.pattern_index.get(&term) {
                debug!(term = %term, files = filenames.len(), "index shortcut");
                self.stage_things(store, filenames, INDEX_LOOKUP_SCORE, now);
            }
        }

        // Patterns change between runs, so re-test every remembered file name.
        // With no terms at all every file would match, which is no signal.
        if self.filter.positive().is_empty() && self.content.is_empty() {
            return;
        }
        let matching: Vec<String> = store
            .things
            .values()
            .filter(|thing| self.filter.is_match(&thing.filename))
            .map(|thing| thing.filename.clone())
            .collect();
        for filename in matching {
            self.stage_things(store, &[filename], INDEX_LOOKUP_SCORE, now);
        }
    }

    fn stage_things(
        &mut self,
        store: &KnowledgeStore,
        filenames: &[String],
        score: f64,
        now: DateTime<Utc>,
    ) {
        let score = dampen(score, filenames.len() as f64);

        for filename in filenames {
            let Some(thing) = store.thing(filename) else {
                continue;
            };

            let mut content_factor = 1.0;
            for pattern in &self.content {
                if let Some(seen) = thing.patterns_seen.get(pattern.text()) {
                    content_factor = boost_recent(content_factor, *seen, now);
                }
            }
            for (captured, seen) in &thing.captured_strings {
                for pattern in &self.content {
                    if pattern.is_match(captured) {
                        content_factor = boost_recent(content_factor, *seen, now);
                    }
                }
            }

            self.stage_vertices(store, &thing.vertex_names, score * content_factor, now);
        }
    }

    fn stage_vertices(
        &mut self,
        store: &KnowledgeStore,
        names: &[String],
        score: f64,
        now: DateTime<Utc>,
    ) {
        let score = dampen(score, names.len() as f64);

        for name in names {
            let Some(vertex) = store.vertex(name) else {
                continue;
            };

            let mut vertex_score = score;
            if let Some(last) = vertex.last_find() {
                vertex_score = boost_recent(vertex_score, last, now);
            }
            vertex_score = amplify(vertex_score, vertex.find_count() as f64);

            let key = vertex.key();
            let paths: Vec<PathBuf> = vertex
                .absolute_paths
                .iter()
                .filter(|path| path.starts_with(&self.root))
                .cloned()
                .collect();
            for path in paths {
                self.stage(path, key.clone(), vertex_score);
            }
        }
    }

    fn seed_root(&mut self, store: &mut KnowledgeStore) {
        let name = directory_name(&self.root);
        let key = store.resolve_vertex(&name, &self.root);
        let id = CandidateId::for_path(&self.root);
        if self.done.contains_key(&id) {
            return;
        }

        let candidate = self
            .staging
            .entry(id)
            .or_insert_with(|| Candidate::new(self.root.clone(), key, f64::INFINITY));
        candidate.score = f64::INFINITY;
        candidate.is_root = true;
    }

    /// Stage a directory. Already-visited directories are ignored; a directory
    /// staged twice before the next flush gets the sum of both scores.
    pub fn stage(&mut self, path: PathBuf, vertex: String, score: f64) {
        let id = CandidateId::for_path(&path);
        if self.done.contains_key(&id) {
            return;
        }
        self.staging
            .entry(id)
            .and_modify(|staged| staged.score += score)
            .or_insert_with(|| Candidate::new(path, vertex, score));
    }

    /// Move everything staged into the live queue
    pub fn flush(&mut self) {
        let mut staged: Vec<Candidate> = self.staging.drain().map(|(_, c)| c).collect();
        // HashMap drain order is arbitrary; keep pushes reproducible
        staged.sort_by(|a, b| a.path.cmp(&b.path));
        for candidate in staged {
            self.live.push(QueueEntry {
                candidate,
                seq: self.seq,
            });
            self.seq += 1;
        }
    }

    /// Score and queue the subdirectories of a visited directory
    pub fn enqueue_children(
        &mut self,
        store: &mut KnowledgeStore,
        parent: &Path,
        children: &[DirEntryInfo],
    ) {
        self.enqueue_children_at(store, parent, children, Utc::now());
    }

    pub fn enqueue_children_at(
        &mut self,
        store: &mut KnowledgeStore,
        parent: &Path,
        children: &[DirEntryInfo],
        now: DateTime<Utc>,
    ) {
        let ancestors = self.ancestor_names(parent);

        for child in children {
            if self.is_visited(&child.path) {
                continue;
            }

            let key = store.resolve_vertex(&child.name, &child.path);
            store.record_adjacency(&child.name, &ancestors);

            let scorer = Scorer::new(&*store, now);
            let Some(vertex) = store.vertex(&key) else {
                continue;
            };
            let mut score = scorer.score(vertex);
            if let Some(modified) = child.modified {
                score = boost_recent(score, modified, now);
            }
            self.stage(child.path.clone(), key, score);
        }

        self.flush();
    }

    /// Names from `dir` up to and including the root, nearest first
    fn ancestor_names(&self, dir: &Path) -> Vec<String> {
        dir.ancestors()
            .take_while(|ancestor| ancestor.starts_with(&self.root))
            .map(directory_name)
            .collect()
    }

    /// Pop the most promising unvisited directory, marking it visited.
    /// `None` once the queue is exhausted.
    pub fn consume(&mut self, store: &mut KnowledgeStore) -> Option<Candidate> {
        while let Some(entry) = self.live.pop() {
            let mut candidate = entry.candidate;
            if self.done.contains_key(&candidate.id) {
                continue;
            }

            candidate.visited = true;
            if let Some(vertex) = store.vertex_mut(&candidate.vertex) {
                vertex.visits += 1;
            }
            self.done.insert(candidate.id, candidate.clone());
            return Some(candidate);
        }
        None
    }

    pub fn is_visited(&self, path: &Path) -> bool {
        self.done.contains_key(&CandidateId::for_path(path))
    }

    pub fn is_filename_match(&self, name: &str) -> bool {
        self.filter.is_match(name)
    }

    /// Re-root at `new_root`, keeping the visited set so nothing is scanned twice
    pub fn ascend(&mut self, store: &mut KnowledgeStore, new_root: &Path) {
        debug!(root = %new_root.display(), "moving search root up");
        self.root = new_root.to_path_buf();
        self.seed_root(store);
        self.flush();
    }

    /// Entries waiting in the live queue, duplicates included
    pub fn pending(&self) -> usize {
        self.live.len()
    }

    pub fn visited_count(&self) -> usize {
        self.done.len()
    }

    #[cfg(test)]
    pub(crate) fn staged_score(&self, path: &Path) -> Option<f64> {
        self.staging
            .get(&CandidateId::for_path(path))
            .map(|candidate| candidate.score)
    }
}
