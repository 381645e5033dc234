//! Decides which files are too binary or too large to scan for content.

use std::collections::HashSet;
use std::path::Path;

/// Files larger than this are not read unless binaries are included
pub const DEFAULT_MAX_FILE_BYTES: u64 = 1_000_000;

pub const DEFAULT_BINARY_EXTENSIONS: &[&str] = &[
    "7z", "a", "avi", "bin", "bmp", "class", "dat", "db", "dll", "dmg", "doc", "docx", "dylib",
    "exe", "gif", "gz", "ico", "iso", "jar", "jpeg", "jpg", "lib", "mov", "mp3", "mp4", "o", "obj",
    "otf", "pdb", "pdf", "png", "pyc", "rar", "rlib", "so", "sqlite", "sz", "tar", "ttf", "wasm",
    "wav", "webp", "woff", "woff2", "xls", "xlsx", "zip",
];

/// Lowercased extension without the dot, or empty when there is none
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct BinaryPolicy {
    extensions: HashSet<String>,
    max_bytes: u64,
}

impl Default for BinaryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_BINARY_EXTENSIONS.iter().map(|ext| ext.to_string()),
            DEFAULT_MAX_FILE_BYTES,
        )
    }
}

impl BinaryPolicy {
    pub fn new(extensions: impl IntoIterator<Item = String>, max_bytes: u64) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            max_bytes,
        }
    }

    /// True when a file should be skipped by the content matcher
    pub fn is_excluded(&self, path: &Path, len: u64) -> bool {
        len > self.max_bytes || self.extensions.contains(&extension_of(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_binary_extensions_are_excluded() {
        let policy = BinaryPolicy::default();
        assert!(policy.is_excluded(Path::new("logo.PNG"), 10));
        assert!(policy.is_excluded(Path::new("lib/app.dll"), 10));
        assert!(!policy.is_excluded(Path::new("main.rs"), 10));
        assert!(!policy.is_excluded(Path::new("Makefile"), 10));
    }

    #[test]
    fn test_oversized_text_is_excluded() {
        let policy = BinaryPolicy::default();
        assert!(!policy.is_excluded(Path::new("dump.txt"), DEFAULT_MAX_FILE_BYTES));
        assert!(policy.is_excluded(Path::new("dump.txt"), DEFAULT_MAX_FILE_BYTES + 1));
    }

    #[test]
    fn test_custom_extensions_accept_leading_dot() {
        let policy = BinaryPolicy::new(vec![".LOG".to_string()], 10);
        assert!(policy.is_excluded(Path::new("server.log"), 1));
        assert!(!policy.is_excluded(Path::new("logo.png"), 1));
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("a/b.TXT")), "txt");
        assert_eq!(extension_of(Path::new("README")), "");
    }
}
