//! Regex matching inside file contents.

use std::fs;
use std::io;
use std::path::Path;

use crate::pattern::ContentPattern;

/// Byte range of one match within its line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    /// Index of the pattern that produced the match
    pub pattern: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// 1-based
    pub line_number: usize,
    pub text: String,
    pub spans: Vec<Span>,
}

impl LineMatch {
    pub fn matched(&self, span: &Span) -> &str {
        &self.text[span.start..span.end]
    }

    /// 1-based column of a span, counted in characters
    pub fn column(&self, span: &Span) -> usize {
        self.text[..span.start].chars().count() + 1
    }
}

/// A file in which every content pattern matched at least once
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMatch {
    pub lines: Vec<LineMatch>,
    /// Texts of the patterns that matched
    pub patterns: Vec<String>,
    /// Distinct matched substrings, in order of first appearance
    pub captures: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ContentMatcher {
    patterns: Vec<ContentPattern>,
    ignore_newlines: bool,
}

impl ContentMatcher {
    pub fn new(patterns: Vec<ContentPattern>, ignore_newlines: bool) -> Self {
        Self {
            patterns,
            ignore_newlines,
        }
    }

    /// Read a file and scan it. Invalid UTF-8 is replaced rather than rejected
    /// so included binaries can still be searched.
    pub fn scan_file(&self, path: &Path) -> io::Result<Option<FileMatch>> {
        let bytes = fs::read(path)?;
        Ok(self.scan_text(&String::from_utf8_lossy(&bytes)))
    }

    /// `None` unless every pattern matched somewhere in `text`
    pub fn scan_text(&self, text: &str) -> Option<FileMatch> {
        if self.patterns.is_empty() {
            return None;
        }

        let mut found = vec![false; self.patterns.len()];
        let mut result = FileMatch::default();

        let lines: Box<dyn Iterator<Item = &str> + '_> = if self.ignore_newlines {
            Box::new(std::iter::once(text))
        } else {
            Box::new(text.lines())
        };

        for (index, line) in lines.enumerate() {
            let mut spans = Vec::new();
            for (pattern_index, pattern) in self.patterns.iter().enumerate() {
                for m in pattern.regex().find_iter(line) {
                    if m.as_str().is_empty() {
                        continue;
                    }
                    found[pattern_index] = true;
                    spans.push(Span {
                        start: m.start(),
                        end: m.end(),
                        pattern: pattern_index,
                    });
                    if !result.captures.iter().any(|c| c == m.as_str()) {
                        result.captures.push(m.as_str().to_string());
                    }
                }
            }
            if !spans.is_empty() {
                spans.sort_by_key(|span| span.start);
                result.lines.push(LineMatch {
                    line_number: index + 1,
                    text: line.to_string(),
                    spans,
                });
            }
        }

        if !found.iter().all(|hit| *hit) {
            return None;
        }
        result.patterns = self
            .patterns
            .iter()
            .map(|pattern| pattern.text().to_string())
            .collect();
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn matcher(patterns: &[&str], ignore_newlines: bool) -> ContentMatcher {
        let patterns = patterns
            .iter()
            .map(|p| ContentPattern::parse(p, false).unwrap())
            .collect();
        ContentMatcher::new(patterns, ignore_newlines)
    }

    #[test]
    fn test_reports_lines_and_columns() {
        let text = "fn main() {\n    todo!();\n    // TODO: later\n}\n";
        let found = matcher(&["todo"], false).scan_text(text).unwrap();

        assert_eq!(found.lines.len(), 2);
        let first = &found.lines[0];
        assert_eq!(first.line_number, 2);
        assert_eq!(first.column(&first.spans[0]), 5);
        assert_eq!(first.matched(&first.spans[0]), "todo");
        assert_eq!(found.lines[1].line_number, 3);
        assert_eq!(found.captures, vec!["todo", "TODO"]);
        assert_eq!(found.patterns, vec!["todo"]);
    }

    #[test]
    fn test_every_pattern_must_match() {
        let text = "alpha\nbeta\n";
        assert!(matcher(&["alpha", "beta"], false).scan_text(text).is_some());
        assert!(matcher(&["alpha", "gamma"], false).scan_text(text).is_none());
    }

    #[test]
    fn test_patterns_match_across_lines_only_when_ignoring_newlines() {
        let text = "begin\nend";
        assert!(matcher(&["begin\\nend"], false).scan_text(text).is_none());

        let found = matcher(&["begin\\nend"], true).scan_text(text).unwrap();
        assert_eq!(found.lines.len(), 1);
        assert_eq!(found.lines[0].line_number, 1);
    }

    #[test]
    fn test_spans_are_ordered_within_a_line() {
        let found = matcher(&["b", "a"], false).scan_text("a b a").unwrap();
        let starts: Vec<usize> = found.lines[0].spans.iter().map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 2, 4]);
        assert_eq!(found.lines[0].spans[0].pattern, 1);
    }

    #[test]
    fn test_scan_file_tolerates_invalid_utf8() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("blob.dat");
        fs::write(&path, [0xff, 0xfe, b'k', b'e', b'y', b'\n']).unwrap();

        let found = matcher(&["key"], false).scan_file(&path).unwrap();
        assert!(found.is_some());
        assert!(matcher(&["key"], false)
            .scan_file(&temp.path().join("missing"))
            .is_err());
    }
}
