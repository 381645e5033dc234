use clap::Parser;
use std::path::PathBuf;

use scout::settings::SearchSettings;

const HELP_TEMPLATE: &str = "
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}";

const AFTER_HELP: &str = "\
Terms are globs matched against whole file names. A term anchored with ^ or $
is a regular expression. Terms after `not` exclude names. Patterns after `--`
are regular expressions searched inside the matching files.

Examples:
  scout '*.rs' not 'test_*'
  scout '*.toml' -- '^edition'";

#[derive(Parser, Debug)]
#[command(name = "scout")]
#[command(about = "Find files and content, visiting the most promising directories first", long_about = None)]
#[command(version)]
#[command(help_template = HELP_TEMPLATE)]
#[command(after_help = AFTER_HELP)]
pub struct Cli {
    /// File name terms, optionally followed by `not` and excluded terms
    pub terms: Vec<String>,

    /// Regular expressions to search for inside matching files
    #[arg(last = true)]
    pub content: Vec<String>,

    /// Directory to search from (default: current directory)
    #[arg(long, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Report skipped directories and files, and run statistics
    #[arg(short, long)]
    pub verbose: bool,

    /// Also search inside binary and oversized files
    #[arg(short, long)]
    pub binary: bool,

    /// Keep searching parent directories until something is found
    #[arg(long)]
    pub up: bool,

    /// Stop at the first result
    #[arg(long)]
    pub first: bool,

    /// Print the directory of each result instead of the file
    #[arg(long)]
    pub dirs: bool,

    /// Print only file paths; never report directory names
    #[arg(long)]
    pub files: bool,

    #[arg(short, long)]
    pub case_sensitive: bool,

    /// Save knowledge as plain JSON instead of compressed
    #[arg(long)]
    pub json: bool,

    /// Treat every term as a regular expression
    #[arg(long)]
    pub no_regex_assist: bool,

    /// Show previous searches from this directory instead of searching
    #[arg(long)]
    pub history: bool,

    /// Match content patterns against the whole file at once
    #[arg(long)]
    pub ignore_newlines: bool,

    /// After searching, interactively replace the content matches
    #[arg(long)]
    pub replace: bool,
}

impl Cli {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            verbose: self.verbose,
            include_binary: self.binary,
            search_in_files: !self.content.is_empty(),
            up: self.up,
            first: self.first,
            directories_only: self.dirs,
            files_only: self.files,
            case_sensitive: self.case_sensitive,
            write_plain_json: self.json,
            no_regex_assist: self.no_regex_assist,
            show_history: self.history,
            ignore_newlines: self.ignore_newlines,
            replace: self.replace,
        }
    }
}
