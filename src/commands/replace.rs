//! Interactive find-and-replace over the files a content search matched.

use anyhow::{Context, Result};
use colored::Colorize;
use regex::NoExpand;
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::fs::locking::locked_write;
use crate::pattern::ContentPattern;
use crate::search::ContentHit;

/// Replace every match of every pattern, one line at a time. Line endings are
/// kept and the replacement is inserted literally.
pub fn replace_in_text(text: &str, patterns: &[ContentPattern], replacement: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let (body, ending) = match line.strip_suffix("\r\n") {
            Some(body) => (body, "\r\n"),
            None => match line.strip_suffix('\n') {
                Some(body) => (body, "\n"),
                None => (line, ""),
            },
        };
        let mut body = body.to_string();
        for pattern in patterns {
            body = pattern
                .regex()
                .replace_all(&body, NoExpand(replacement))
                .into_owned();
        }
        result.push_str(&body);
        result.push_str(ending);
    }
    result
}

/// Files that already contain the replacement text
pub fn ambiguous_files(files: &BTreeSet<PathBuf>, replacement: &str) -> Vec<PathBuf> {
    files
        .iter()
        .filter(|path| {
            fs::read_to_string(path)
                .map(|text| text.contains(replacement))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

fn ask(input: &mut impl BufRead, output: &mut impl Write, question: &str) -> Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut answer = String::new();
    input
        .read_line(&mut answer)
        .context("Failed to read answer")?;
    Ok(answer.trim_end_matches(['\r', '\n']).to_string())
}

/// Prompt on stdin/stdout
pub fn execute(hits: &[ContentHit], patterns: &[ContentPattern]) -> Result<usize> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    run(hits, patterns, &mut stdin.lock(), &mut stdout)
}

/// Ask for a replacement, warn about ambiguity, confirm, then rewrite.
/// Returns the number of files updated.
pub fn run(
    hits: &[ContentHit],
    patterns: &[ContentPattern],
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> Result<usize> {
    if hits.is_empty() {
        writeln!(output, "No results found. Cannot perform replace.")?;
        return Ok(0);
    }

    writeln!(output)?;
    writeln!(output, "{}", "-".repeat(62))?;
    writeln!(output)?;
    let replacement = ask(input, output, "Please enter the replacement string: ")?;

    let files: BTreeSet<PathBuf> = hits.iter().map(|hit| hit.path.clone()).collect();
    let ambiguous = ambiguous_files(&files, &replacement);
    if ambiguous.is_empty() {
        writeln!(output, "No ambiguities found!")?;
    } else {
        writeln!(
            output,
            "{}",
            format!(
                "Possible ambiguities found! (the string \"{replacement}\" already exists in these files)"
            )
            .yellow()
        )?;
        for path in &ambiguous {
            writeln!(output, "  {}", path.display())?;
        }
    }

    let locations: usize = hits
        .iter()
        .map(|hit| hit.found.lines.iter().map(|l| l.spans.len()).sum::<usize>())
        .sum();
    let described: Vec<String> = patterns
        .iter()
        .map(|pattern| format!("\"{}\"", pattern.text()))
        .collect();
    let answer = ask(
        input,
        output,
        &format!(
            "Are you sure you want to replace {} with \"{replacement}\" in these {locations} locations? (y/n): ",
            described.join(",")
        ),
    )?;
    if !answer.trim().to_lowercase().starts_with('y') {
        return Ok(0);
    }

    let mut updated = 0;
    for path in &files {
        writeln!(output, "Updating {}", path.display())?;
        let result = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|text| locked_write(path, &replace_in_text(&text, patterns, &replacement)));
        match result {
            Ok(()) => updated += 1,
            Err(err) => writeln!(output, "{}", format!("{err:#}").red())?,
        }
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ContentMatcher;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn patterns(list: &[&str]) -> Vec<ContentPattern> {
        list.iter()
            .map(|p| ContentPattern::parse(p, false).unwrap())
            .collect()
    }

    fn hit(path: PathBuf, patterns: &[ContentPattern]) -> ContentHit {
        let matcher = ContentMatcher::new(patterns.to_vec(), false);
        let found = matcher.scan_file(&path).unwrap().unwrap();
        ContentHit { path, found }
    }

    #[test]
    fn test_replace_keeps_line_endings_and_is_literal() {
        let text = "old value\r\nkeep\nOLD again";
        let result = replace_in_text(text, &patterns(&["old"]), "$new");
        assert_eq!(result, "$new value\r\nkeep\n$new again");
    }

    #[test]
    fn test_declined_replace_changes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("a.txt");
        fs::write(&path, "color = red\n").unwrap();
        let patterns = patterns(&["red"]);
        let hits = vec![hit(path.clone(), &patterns)];

        let mut input = Cursor::new("blue\nn\n");
        let mut output = Vec::new();
        let updated = run(&hits, &patterns, &mut input, &mut output).unwrap();

        assert_eq!(updated, 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "color = red\n");
    }

    #[test]
    fn test_confirmed_replace_rewrites_files_and_warns_on_ambiguity() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("a.txt");
        let second = temp.path().join("b.txt");
        fs::write(&first, "red\nred and blue\n").unwrap();
        fs::write(&second, "Red\n").unwrap();
        let patterns = patterns(&["red"]);
        let hits = vec![hit(first.clone(), &patterns), hit(second.clone(), &patterns)];

        let mut input = Cursor::new("blue\ny\n");
        let mut output = Vec::new();
        let updated = run(&hits, &patterns, &mut input, &mut output).unwrap();

        assert_eq!(updated, 2);
        assert_eq!(fs::read_to_string(&first).unwrap(), "blue\nblue and blue\n");
        assert_eq!(fs::read_to_string(&second).unwrap(), "blue\n");
        let shown = String::from_utf8(output).unwrap();
        assert!(shown.contains("Possible ambiguities found!"));
        assert!(shown.contains("in these 3 locations"));
    }

    #[test]
    fn test_no_hits_cannot_replace() {
        let mut input = Cursor::new("");
        let mut output = Vec::new();
        assert_eq!(run(&[], &[], &mut input, &mut output).unwrap(), 0);
        assert!(String::from_utf8(output)
            .unwrap()
            .contains("Cannot perform replace"));
    }
}
