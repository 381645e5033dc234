//! Flags that shape a search run.

use serde::{Deserialize, Serialize};

use crate::pattern::TermOptions;

/// Boolean switches from the command line. Fields marked `skip` only affect
/// presentation and are left out of the archived run history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    #[serde(skip)]
    pub verbose: bool,
    pub include_binary: bool,
    pub search_in_files: bool,
    /// Re-root at the parent directory until something is found
    pub up: bool,
    /// Stop at the first result
    pub first: bool,
    #[serde(skip)]
    pub directories_only: bool,
    pub files_only: bool,
    pub case_sensitive: bool,
    #[serde(skip)]
    pub write_plain_json: bool,
    #[serde(skip)]
    pub no_regex_assist: bool,
    #[serde(skip)]
    pub show_history: bool,
    #[serde(skip)]
    pub ignore_newlines: bool,
    #[serde(skip)]
    pub replace: bool,
}

impl SearchSettings {
    pub fn term_options(&self) -> TermOptions {
        TermOptions {
            case_sensitive: self.case_sensitive,
            regex_assist: !self.no_regex_assist,
        }
    }

    /// One `name: value` line per flag, for verbose output
    pub fn describe(&self) -> String {
        let flags = [
            ("include_binary", self.include_binary),
            ("search_in_files", self.search_in_files),
            ("up", self.up),
            ("first", self.first),
            ("directories_only", self.directories_only),
            ("files_only", self.files_only),
            ("case_sensitive", self.case_sensitive),
            ("write_plain_json", self.write_plain_json),
            ("regex_assist", !self.no_regex_assist),
            ("ignore_newlines", self.ignore_newlines),
            ("replace", self.replace),
        ];
        flags
            .iter()
            .map(|(name, value)| format!("\t{name}: {value}\n"))
            .collect()
    }
}
