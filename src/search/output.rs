//! Result rendering on stdout.

use colored::Colorize;
use std::path::{Path, PathBuf};

use super::content::{LineMatch, Span};

/// Width the `name (line,col):` prefix is padded to
const PREFIX_WIDTH: usize = 35;
/// Context longer than this is shortened
const MAX_CONTEXT_CHARS: usize = 100;
/// Characters of context kept when shortening
const KEPT_CONTEXT_CHARS: usize = 30;

/// Keep the end of overly long leading context
pub fn shorten_leading(text: &str) -> String {
    let text = text.trim_start();
    let count = text.chars().count();
    if count <= MAX_CONTEXT_CHARS {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - KEPT_CONTEXT_CHARS).collect();
    format!("...{tail}")
}

/// Keep the start of overly long trailing context
pub fn shorten_trailing(text: &str) -> String {
    let text = text.trim_end();
    if text.chars().count() <= MAX_CONTEXT_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(KEPT_CONTEXT_CHARS).collect();
    format!("{head}...")
}

/// The three printed pieces of one match: padded prefix plus leading
/// context, the match itself, and trailing context.
pub fn match_parts(file_name: &str, line: &LineMatch, span: &Span) -> (String, String, String) {
    let prefix = format!(
        "{} ({},{}):",
        file_name,
        line.line_number,
        line.column(span)
    );
    let lead = shorten_leading(&line.text[..span.start]);
    let trail = shorten_trailing(&line.text[span.end..]);
    (
        format!("{prefix:<width$}{lead}", width = PREFIX_WIDTH),
        line.matched(span).to_string(),
        trail,
    )
}

/// Writes results as they are found
#[derive(Debug)]
pub struct Printer {
    root: PathBuf,
    /// Directory whose header was printed last
    last_header: Option<PathBuf>,
    enabled: bool,
}

impl Printer {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            last_header: None,
            enabled: true,
        }
    }

    /// A printer that writes nothing
    pub fn quiet(root: &Path) -> Self {
        Self {
            enabled: false,
            ..Self::new(root)
        }
    }

    pub fn set_root(&mut self, root: &Path) {
        self.root = root.to_path_buf();
    }

    pub fn path(&self, path: &Path) {
        if self.enabled {
            println!("{}", path.display());
        }
    }

    /// Print every match of one file under a dimmed directory header
    pub fn content(&mut self, path: &Path, lines: &[LineMatch]) {
        if !self.enabled {
            return;
        }

        if let Some(dir) = path.parent() {
            if self.last_header.as_deref() != Some(dir) {
                let relative = dir.strip_prefix(&self.root).unwrap_or(dir);
                if !relative.as_os_str().is_empty() {
                    println!("{}", relative.display().to_string().dimmed());
                }
                self.last_header = Some(dir.to_path_buf());
            }
        }

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        for line in lines {
            for span in &line.spans {
                let (lead, matched, trail) = match_parts(&name, line, span);
                println!("{lead}{}{trail}", matched.bold().white());
            }
        }
    }
}
