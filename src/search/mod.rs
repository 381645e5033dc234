//! The traversal loop that visits directories in scheduler order.

pub mod cancel;
pub mod content;
pub mod finalize;
pub mod output;


use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::fs::accessor::{DirEntryInfo, DirectoryAccessor};
use crate::fs::binary::{extension_of, BinaryPolicy};
use crate::knowledge::{KnowledgeStore, RunMetrics};
use crate::pattern::SearchTerms;
use crate::scheduler::{Candidate, Scheduler};
use crate::settings::SearchSettings;

pub use cancel::CancelToken;
pub use content::{ContentMatcher, FileMatch};
pub use finalize::{FinalizeOutcome, Finalizer};
pub use output::Printer;

/// A file whose contents matched
#[derive(Debug, Clone)]
pub struct ContentHit {
    pub path: PathBuf,
    pub found: FileMatch,
}

/// Everything one run produced
#[derive(Debug)]
pub struct SearchOutcome {
    /// Files (or their directories with `--dirs`) reported by name
    pub matches: Vec<PathBuf>,
    /// Directories whose own name matched
    pub directories: Vec<PathBuf>,
    pub content_hits: Vec<ContentHit>,
    pub metrics: RunMetrics,
    /// False when the run was interrupted
    pub completed: bool,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty() && self.directories.is_empty() && self.content_hits.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Exhausted,
    /// `--first` found its result
    Stopped,
    Cancelled,
}

pub struct Searcher<'a, A: DirectoryAccessor> {
    accessor: &'a A,
    terms: &'a SearchTerms,
    settings: &'a SearchSettings,
    binary: BinaryPolicy,
    matcher: ContentMatcher,
    cancel: CancelToken,
    printer: Printer,
}

impl<'a, A: DirectoryAccessor> Searcher<'a, A> {
    pub fn new(
        accessor: &'a A,
        terms: &'a SearchTerms,
        settings: &'a SearchSettings,
        binary: BinaryPolicy,
        cancel: CancelToken,
        printer: Printer,
    ) -> Self {
        Self {
            accessor,
            terms,
            settings,
            binary,
            matcher: ContentMatcher::new(terms.content.clone(), settings.ignore_newlines),
            cancel,
            printer,
        }
    }

    /// Scan from `root` until the queue runs dry, `--first` is satisfied or
    /// the run is cancelled.
    pub fn run(&mut self, store: &mut KnowledgeStore, root: &Path, args: &str) -> SearchOutcome {
        let started = Instant::now();
        let mut outcome = SearchOutcome {
            matches: Vec::new(),
            directories: Vec::new(),
            content_hits: Vec::new(),
            metrics: RunMetrics::new(self.settings.clone(), args),
            completed: false,
        };

        let mut scheduler = Scheduler::new(
            root,
            self.terms.filter.clone(),
            self.terms.content.clone(),
        );
        scheduler.initialize(store);

        let flow = loop {
            let flow = self.drain(store, &mut scheduler, &mut outcome);
            if flow != Flow::Exhausted || !self.settings.up || !outcome.is_empty() {
                break flow;
            }
            let Some(parent) = scheduler.root().parent().map(Path::to_path_buf) else {
                break flow;
            };
            info!(root = %parent.display(), "nothing found, searching one level up");
            self.printer.set_root(&parent);
            scheduler.ascend(store, &parent);
        };

        outcome.completed = flow != Flow::Cancelled;
        outcome.metrics.is_complete = outcome.completed;
        outcome.metrics.duration_ms = started.elapsed().as_millis() as u64;
        info!(
            directories = outcome.metrics.directory_count,
            files = outcome.metrics.file_count,
            ms = outcome.metrics.duration_ms,
            "search finished"
        );
        outcome
    }

    fn drain(
        &mut self,
        store: &mut KnowledgeStore,
        scheduler: &mut Scheduler,
        outcome: &mut SearchOutcome,
    ) -> Flow {
        loop {
            if self.cancel.is_cancelled() {
                return Flow::Cancelled;
            }
            let Some(candidate) = scheduler.consume(store) else {
                return Flow::Exhausted;
            };
            outcome.metrics.directory_count += 1;

            let listing = match self.accessor.list(&candidate.path) {
                Ok(listing) => listing,
                Err(err) => {
                    let relative = err
                        .path()
                        .strip_prefix(scheduler.root())
                        .unwrap_or(err.path());
                    warn!(path = %relative.display(), "skipping directory: {err}");
                    continue;
                }
            };

            let (finds, stop) = self.visit_files(store, &candidate, &listing.files, outcome);
            if finds > 0 {
                if let Some(vertex) = store.vertex_mut(&candidate.vertex) {
                    vertex.last_find_count.record(finds);
                }
            }
            if stop {
                return Flow::Stopped;
            }

            scheduler.enqueue_children(store, &candidate.path, &listing.dirs);

            if !self.terms.searches_content()
                && !self.settings.files_only
                && scheduler.is_filename_match(&candidate.name())
            {
                self.printer.path(&candidate.path);
                outcome.directories.push(candidate.path.clone());
                if self.settings.first {
                    return Flow::Stopped;
                }
            }
        }
    }

    /// Inspect the files of one directory. Returns the number of finds and
    /// whether `--first` asks to stop.
    fn visit_files(
        &mut self,
        store: &mut KnowledgeStore,
        candidate: &Candidate,
        files: &[DirEntryInfo],
        outcome: &mut SearchOutcome,
    ) -> (u64, bool) {
        let mut finds = 0;
        let directory = candidate.name();
        let positive = self.terms.filter.positive_texts();

        for file in files {
            outcome.metrics.file_count += 1;
            if !self.terms.filter.is_match(&file.name) {
                continue;
            }
            outcome.metrics.file_match_count += 1;

            let found = if self.terms.searches_content() {
                match self.scan(file, outcome) {
                    Some(found) => found,
                    None => continue,
                }
            } else {
                FileMatch::default()
            };

            finds += 1;
            if let Some(vertex) = store.vertex_mut(&candidate.vertex) {
                vertex.record_find(Utc::now());
            }
            store.upsert_thing(
                &file.name,
                &positive,
                &found.patterns,
                &found.captures,
                &directory,
            );

            self.report(candidate, file, found, outcome);
            if self.settings.first {
                return (finds, true);
            }
        }
        (finds, false)
    }

    fn scan(&self, file: &DirEntryInfo, outcome: &mut SearchOutcome) -> Option<FileMatch> {
        let extension = extension_of(&file.path);
        if !self.settings.include_binary && self.binary.is_excluded(&file.path, file.len) {
            info!(
                path = %file.path.display(),
                bytes = file.len,
                "excluding binary or oversized file"
            );
            outcome.metrics.record_excluded(&extension, file.len);
            return None;
        }
        outcome.metrics.record_scanned(&extension, file.len);

        match self.matcher.scan_file(&file.path) {
            Ok(Some(found)) => {
                outcome.metrics.file_match_inside_count += 1;
                outcome.metrics.match_row_count += found.lines.len() as u64;
                Some(found)
            }
            Ok(None) => None,
            Err(err) => {
                info!(path = %file.path.display(), "skipping unreadable file: {err}");
                None
            }
        }
    }

    fn report(
        &mut self,
        candidate: &Candidate,
        file: &DirEntryInfo,
        found: FileMatch,
        outcome: &mut SearchOutcome,
    ) {
        if !self.terms.searches_content() {
            let shown = if self.settings.directories_only {
                candidate.path.clone()
            } else {
                file.path.clone()
            };
            self.printer.path(&shown);
            outcome.matches.push(shown);
            return;
        }

        if self.settings.files_only {
            self.printer.path(&file.path);
        } else if self.settings.directories_only {
            self.printer.path(&candidate.path);
        } else {
            self.printer.content(&file.path, &found.lines);
        }
        outcome.content_hits.push(ContentHit {
            path: file.path.clone(),
            found,
        });
    }
}
