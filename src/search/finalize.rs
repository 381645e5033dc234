//! End-of-run persistence, shared by the normal and the interrupted path.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::fs::state::StateFile;
use crate::knowledge::{KnowledgeStore, RunMetrics};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeOutcome {
    Written(PathBuf),
    /// Interrupted too early for the run to be worth remembering
    TooShort,
    AlreadyWritten,
}

/// Writes the store at most once per run
#[derive(Debug)]
pub struct Finalizer {
    started: Instant,
    min_elapsed: Duration,
    written: Mutex<bool>,
}

impl Finalizer {
    pub fn new(min_elapsed: Duration) -> Self {
        Self::started_at(Instant::now(), min_elapsed)
    }

    pub fn started_at(started: Instant, min_elapsed: Duration) -> Self {
        Self {
            started,
            min_elapsed,
            written: Mutex::new(false),
        }
    }

    /// Record the run, prune the graph and save it.
    ///
    /// An incomplete run is only saved once `min_elapsed` has passed.
    pub fn finalize(
        &self,
        store: &mut KnowledgeStore,
        state: &StateFile,
        ceiling: usize,
        root: &Path,
        metrics: RunMetrics,
    ) -> Result<FinalizeOutcome> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if *written {
            return Ok(FinalizeOutcome::AlreadyWritten);
        }
        if !metrics.is_complete && self.started.elapsed() < self.min_elapsed {
            debug!("run interrupted after {:?}; not saving", self.started.elapsed());
            return Ok(FinalizeOutcome::TooShort);
        }

        store.record_run(root, metrics);
        store.evict(ceiling);
        let path = state.save(store)?;
        *written = true;
        Ok(FinalizeOutcome::Written(path))
    }
}
