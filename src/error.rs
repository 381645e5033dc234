//! Error types shared across the crate.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to enumerate one directory. Always recoverable: the directory is
/// skipped and the scan continues.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("directory not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("access denied: {}", .0.display())]
    AccessDenied(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ScanError {
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => ScanError::AccessDenied(path.to_path_buf()),
            _ => ScanError::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ScanError::NotFound(path) | ScanError::AccessDenied(path) => path,
            ScanError::Io { path, .. } => path,
        }
    }
}

/// A search term the user supplied could not be compiled
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid file name pattern '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid regular expression '{pattern}': {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_error_classifies_io_kinds() {
        let path = Path::new("/missing");
        let err = ScanError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, ScanError::NotFound(_)));

        let err = ScanError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, ScanError::AccessDenied(_)));
        assert_eq!(err.path(), path);

        let err = ScanError::from_io(path, io::Error::other("disk on fire"));
        assert!(err.to_string().contains("disk on fire"));
    }
}
