//! Search terms: file name filters and in-file content patterns.
//!
//! Positional terms are file name filters, OR-combined. A `not` keyword
//! starts the negative group: a name matching any negative term is rejected.
//! With regex assist on, a term is a glob matched against the whole name
//! unless it is explicitly anchored with `^` or `$`, which makes it a regex.

use glob::{MatchOptions, Pattern};
use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Keyword that switches the remaining terms to the negative group
pub const NOT_KEYWORD: &str = "not";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermOptions {
    pub case_sensitive: bool,
    pub regex_assist: bool,
}

impl Default for TermOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            regex_assist: true,
        }
    }
}

/// Compile a regex honoring the case-sensitivity flag
pub fn build_regex(text: &str, case_sensitive: bool) -> Result<Regex, PatternError> {
    RegexBuilder::new(text)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|source| PatternError::Regex {
            pattern: text.to_string(),
            source,
        })
}

#[derive(Debug, Clone)]
enum Matcher {
    Glob {
        pattern: Pattern,
        options: MatchOptions,
    },
    Regex(Regex),
}

/// One compiled file name term, remembering the text the user typed
#[derive(Debug, Clone)]
pub struct Term {
    text: String,
    matcher: Matcher,
}

impl Term {
    pub fn parse(text: &str, options: TermOptions) -> Result<Self, PatternError> {
        let anchored = text.starts_with('^') || text.ends_with('$');
        let matcher = if options.regex_assist && !anchored {
            let pattern = Pattern::new(text).map_err(|source| PatternError::Glob {
                pattern: text.to_string(),
                source,
            })?;
            Matcher::Glob {
                pattern,
                options: MatchOptions {
                    case_sensitive: options.case_sensitive,
                    require_literal_separator: false,
                    require_literal_leading_dot: false,
                },
            }
        } else {
            Matcher::Regex(build_regex(text, options.case_sensitive)?)
        };

        Ok(Self {
            text: text.to_string(),
            matcher,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_match(&self, name: &str) -> bool {
        match &self.matcher {
            Matcher::Glob { pattern, options } => pattern.matches_with(name, *options),
            Matcher::Regex(regex) => regex.is_match(name),
        }
    }
}

/// File name filter: any positive term must match (vacuously true when there
/// are none) and no negative term may match.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    positive: Vec<Term>,
    negative: Vec<Term>,
}

impl NameFilter {
    pub fn new(positive: Vec<Term>, negative: Vec<Term>) -> Self {
        Self { positive, negative }
    }

    pub fn is_match(&self, name: &str) -> bool {
        let included =
            self.positive.is_empty() || self.positive.iter().any(|term| term.is_match(name));
        included && !self.negative.iter().any(|term| term.is_match(name))
    }

    pub fn positive(&self) -> &[Term] {
        &self.positive
    }

    pub fn negative(&self) -> &[Term] {
        &self.negative
    }

    /// Texts of the positive terms, as recorded in the pattern index
    pub fn positive_texts(&self) -> Vec<String> {
        self.positive.iter().map(|t| t.text.clone()).collect()
    }
}

/// A regex searched for inside files
#[derive(Debug, Clone)]
pub struct ContentPattern {
    text: String,
    regex: Regex,
}

impl ContentPattern {
    pub fn parse(text: &str, case_sensitive: bool) -> Result<Self, PatternError> {
        Ok(Self {
            text: text.to_string(),
            regex: build_regex(text, case_sensitive)?,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.regex.is_match(haystack)
    }
}

/// Everything the user asked to search for
#[derive(Debug, Clone, Default)]
pub struct SearchTerms {
    pub filter: NameFilter,
    pub content: Vec<ContentPattern>,
}

impl SearchTerms {
    /// Compile positional terms (with an optional `not` group) and the content
    /// patterns given after `--`. Fails on the first malformed term.
    pub fn parse(
        terms: &[String],
        content: &[String],
        options: TermOptions,
    ) -> Result<Self, PatternError> {
        let mut positive = Vec::new();
        let mut negative = Vec::new();
        let mut negating = false;

        for term in terms {
            if term.eq_ignore_ascii_case(NOT_KEYWORD) {
                negating = true;
                continue;
            }
            let compiled = Term::parse(term, options)?;
            if negating {
                negative.push(compiled);
            } else {
                positive.push(compiled);
            }
        }

        let content = content
            .iter()
            .map(|text| ContentPattern::parse(text, options.case_sensitive))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            filter: NameFilter::new(positive, negative),
            content,
        })
    }

    pub fn searches_content(&self) -> bool {
        !self.content.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn parse(list: &[&str]) -> SearchTerms {
        SearchTerms::parse(&terms(list), &[], TermOptions::default()).unwrap()
    }

    #[test]
    fn test_positive_or_negative_and_not() {
        let search = parse(&["*.txt", "*.md", "not", "draft*"]);

        assert!(search.filter.is_match("notes.txt"));
        assert!(!search.filter.is_match("draft.md"));
        assert!(!search.filter.is_match("image.png"));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let search = parse(&[]);
        assert!(search.filter.is_match("anything.bin"));
    }

    #[test]
    fn test_only_negative_terms() {
        let search = parse(&["not", "*.lock"]);
        assert!(search.filter.is_match("Cargo.toml"));
        assert!(!search.filter.is_match("Cargo.lock"));
    }

    #[test]
    fn test_glob_matches_whole_name() {
        let search = parse(&["main.rs"]);
        assert!(search.filter.is_match("main.rs"));
        assert!(search.filter.is_match("MAIN.RS"));
        assert!(!search.filter.is_match("domain.rs"));
    }

    #[test]
    fn test_case_sensitive_glob() {
        let options = TermOptions {
            case_sensitive: true,
            regex_assist: true,
        };
        let search = SearchTerms::parse(&terms(&["*.TXT"]), &[], options).unwrap();
        assert!(search.filter.is_match("a.TXT"));
        assert!(!search.filter.is_match("a.txt"));
    }

    #[test]
    fn test_anchored_term_is_regex() {
        let search = parse(&["^test_.*\\.rs$"]);
        assert!(search.filter.is_match("test_scheduler.rs"));
        assert!(!search.filter.is_match("scheduler_test.rs"));
    }

    #[test]
    fn test_without_regex_assist_terms_are_unanchored_regex() {
        let options = TermOptions {
            case_sensitive: false,
            regex_assist: false,
        };
        let search = SearchTerms::parse(&terms(&["conf"]), &[], options).unwrap();
        assert!(search.filter.is_match("app.config.json"));
        assert!(!search.filter.is_match("readme.md"));
    }

    #[test]
    fn test_malformed_terms_fail() {
        let err = SearchTerms::parse(&terms(&["[abc"]), &[], TermOptions::default()).unwrap_err();
        assert!(matches!(err, PatternError::Glob { .. }));

        let err =
            SearchTerms::parse(&terms(&["*.rs"]), &terms(&["(unclosed"]), TermOptions::default())
                .unwrap_err();
        assert!(matches!(err, PatternError::Regex { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_positive_texts_keep_user_spelling() {
        let search = parse(&["*.TXT", "not", "tmp*"]);
        assert_eq!(search.filter.positive_texts(), vec!["*.TXT"]);
        assert_eq!(search.filter.negative().len(), 1);
    }

    #[test]
    fn test_content_patterns_respect_case() {
        let search = SearchTerms::parse(&[], &terms(&["todo"]), TermOptions::default()).unwrap();
        assert!(search.searches_content());
        assert!(search.content[0].is_match("// TODO: later"));

        let options = TermOptions {
            case_sensitive: true,
            regex_assist: true,
        };
        let search = SearchTerms::parse(&[], &terms(&["todo"]), options).unwrap();
        assert!(!search.content[0].is_match("// TODO: later"));
    }
}
