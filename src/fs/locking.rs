//! Advisory-locked file I/O.
//!
//! Two `scout` processes finishing at the same time both rewrite the state
//! file. Every reader and writer goes through these functions so the `fs2`
//! locks actually serialize them.

use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Read a whole file under a shared lock
pub fn locked_read_bytes(path: &Path) -> Result<Vec<u8>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open file: {}", path.display()))?;
    file.lock_shared()
        .with_context(|| format!("Failed to acquire shared lock: {}", path.display()))?;
    let mut content = Vec::new();
    BufReader::new(&file)
        .read_to_end(&mut content)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(content)
}

/// Replace a file's contents under an exclusive lock.
///
/// The file is truncated only once the lock is held, so a concurrent reader
/// never observes it empty.
pub fn locked_write_bytes(path: &Path, content: &[u8]) -> Result<()> {
    #[allow(clippy::suspicious_open_options)]
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .open(path)
        .with_context(|| format!("Failed to open file for writing: {}", path.display()))?;
    file.lock_exclusive()
        .with_context(|| format!("Failed to acquire exclusive lock: {}", path.display()))?;
    file.set_len(0)
        .with_context(|| format!("Failed to truncate file: {}", path.display()))?;
    let mut writer = BufWriter::new(&file);
    writer
        .write_all(content)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to flush file: {}", path.display()))?;
    Ok(())
}

pub fn locked_write(path: &Path, content: &str) -> Result<()> {
    locked_write_bytes(path, content.as_bytes())
}
