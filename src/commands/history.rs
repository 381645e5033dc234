//! `scout --history`: show past runs for a search root.

use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::config::Config;
use crate::fs::state::StateFile;
use crate::knowledge::RunMetrics;

pub fn execute(root: &Path) -> Result<()> {
    let config = Config::load()?;
    let store = StateFile::new(config.state_dir()?, false).load();
    let runs = store.history(root);

    if runs.is_empty() {
        println!("No previous searches from {}", root.display());
        return Ok(());
    }

    println!("{} {}", "Search history for".bold(), root.display());
    for run in runs {
        println!("{}", describe(run));
    }
    Ok(())
}

/// Two-line summary of one past run
pub fn describe(run: &RunMetrics) -> String {
    let status = if run.is_complete {
        "complete".green()
    } else {
        "interrupted".yellow()
    };
    let extensions: Vec<String> = run
        .top_extensions(run.scan_size_by_extension.len())
        .into_iter()
        .map(|(ext, bytes)| format!("{}={bytes}", if ext.is_empty() { "-" } else { ext }))
        .collect();

    let mut text = format!(
        "{}  {}  {} ({} ms)\n    {} dirs, {} files, {} name matches, {} content matches, {} rows",
        run.search_date.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
        run.args.cyan(),
        status,
        run.duration_ms,
        run.directory_count,
        run.file_count,
        run.file_match_count,
        run.file_match_inside_count,
        run.match_row_count,
    );
    if !extensions.is_empty() {
        text.push_str(&format!(
            "\n    scanned {} bytes: {}",
            run.total_bytes_scanned,
            extensions.join(", ")
        ));
    }
    text
}
