//! The default command: search from a root, learning as it goes.

use anyhow::{anyhow, bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::commands::replace;
use crate::config::Config;
use crate::fs::accessor::LocalFs;
use crate::fs::state::StateFile;
use crate::pattern::SearchTerms;
use crate::search::cancel::INTERRUPTED_EXIT_CODE;
use crate::search::{CancelToken, FinalizeOutcome, Finalizer, Printer, Searcher};
use crate::settings::SearchSettings;

/// Resolve the directory to search from, defaulting to the working directory
pub fn resolve_root(root: Option<PathBuf>) -> Result<PathBuf> {
    let root = match root {
        Some(root) => root,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("Cannot search {}", root.display()))
}

pub fn execute(
    settings: SearchSettings,
    terms: Vec<String>,
    content: Vec<String>,
    root: &Path,
    args: &str,
) -> Result<()> {
    let config = Config::load()?;
    let state = StateFile::new(config.state_dir()?, settings.write_plain_json);
    let loading = state.load_in_background();

    let terms = SearchTerms::parse(&terms, &content, settings.term_options())?;
    if settings.replace && !terms.searches_content() {
        bail!("--replace needs content patterns after --");
    }
    info!("searching {} with\n{}", root.display(), settings.describe());

    let mut store = loading
        .join()
        .map_err(|_| anyhow!("Knowledge store loader panicked"))?;

    let cancel = CancelToken::new();
    cancel.install_ctrlc()?;
    let finalizer = Finalizer::new(config.min_persist());

    let outcome = {
        let mut searcher = Searcher::new(
            &LocalFs,
            &terms,
            &settings,
            config.binary_policy(),
            cancel.clone(),
            Printer::new(root),
        );
        searcher.run(&mut store, root, args)
    };

    if settings.replace && outcome.completed {
        let updated = replace::execute(&outcome.content_hits, &terms.content)?;
        debug!(updated, "replace finished");
    }

    let completed = outcome.completed;
    match finalizer.finalize(
        &mut store,
        &state,
        config.vertex_ceiling,
        root,
        outcome.metrics,
    )? {
        FinalizeOutcome::Written(path) => debug!(path = %path.display(), "knowledge saved"),
        FinalizeOutcome::TooShort => info!("interrupted early; knowledge not saved"),
        FinalizeOutcome::AlreadyWritten => {}
    }

    if !completed {
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    Ok(())
}
