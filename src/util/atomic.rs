//! Atomic file writing via tempfile + rename.
//!
//! Content is written to a [`tempfile::NamedTempFile`] in the target's
//! directory, then renamed into place, so readers never observe a
//! half-written HTML file.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

fn staged(path: &Path, content: &str) -> io::Result<NamedTempFile> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    Ok(tmp)
}

/// Atomically replace `path` with `content`.
///
/// # Errors
///
/// Fails if the parent directory is missing or unwritable, or the rename
/// fails (e.g., cross-device).
pub fn atomic_write(path: &Path, content: &str) -> io::Result<()> {
    staged(path, content)?
        .persist(path)
        .map(|_| ())
        .map_err(|e| e.error)
}

/// Atomically create `path` with `content`, never replacing an existing file.
///
/// # Errors
///
/// Returns an error of kind [`io::ErrorKind::AlreadyExists`] if `path`
/// exists by the time the rename happens.
pub fn atomic_create(path: &Path, content: &str) -> io::Result<()> {
    staged(path, content)?
        .persist_noclobber(path)
        .map(|_| ())
        .map_err(|e| e.error)
}
