//! Filesystem enumeration used by the search driver.

use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ScanError;

/// One child of a listed directory
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub path: PathBuf,
    pub name: String,
    pub modified: Option<DateTime<Utc>>,
    pub len: u64,
}

/// Children of one directory, split by kind
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub dirs: Vec<DirEntryInfo>,
    pub files: Vec<DirEntryInfo>,
}

/// Source of directory listings
pub trait DirectoryAccessor {
    fn list(&self, dir: &Path) -> Result<Listing, ScanError>;
}

/// Reads the local filesystem. Symlinked directories are not followed so the
/// walk cannot loop; symlinked files are listed as files.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl DirectoryAccessor for LocalFs {
    fn list(&self, dir: &Path) -> Result<Listing, ScanError> {
        let entries = fs::read_dir(dir).map_err(|err| ScanError::from_io(dir, err))?;
        let mut listing = Listing::default();

        for entry in entries {
            let entry = entry.map_err(|err| ScanError::from_io(dir, err))?;
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    debug!(path = %path.display(), "cannot stat entry: {err}");
                    continue;
                }
            };

            let metadata = if file_type.is_symlink() {
                match fs::metadata(&path) {
                    Ok(target) if target.is_dir() => {
                        debug!(path = %path.display(), "not following directory symlink");
                        continue;
                    }
                    Ok(target) => target,
                    Err(_) => continue,
                }
            } else {
                match entry.metadata() {
                    Ok(metadata) => metadata,
                    Err(err) => {
                        debug!(path = %path.display(), "cannot stat entry: {err}");
                        continue;
                    }
                }
            };

            let info = DirEntryInfo {
                name: entry.file_name().to_string_lossy().to_string(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
                len: metadata.len(),
                path,
            };
            if metadata.is_dir() {
                listing.dirs.push(info);
            } else {
                listing.files.push(info);
            }
        }

        listing.dirs.sort_by(|a, b| a.name.cmp(&b.name));
        listing.files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(listing)
    }
}
