//! Loading, saving and creating HTML files.
//!
//! A [`Document`] lives only for the duration of one tool call: it is
//! loaded from disk, mutated, written back whole and dropped. Concurrent
//! calls against the same file are not coordinated; the last save wins.

use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EditorError, EditorResult};
use crate::html::Document;
use crate::html::template::PageTemplate;
use crate::util::atomic::{atomic_create, atomic_write};

/// Read and parse the HTML file at `path`.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn load(path: &Path) -> EditorResult<Document> {
    debug!(path = %path.display(), "loading HTML file");
    if !path.exists() {
        return Err(EditorError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = std::fs::read(path).map_err(|e| EditorError::io(path, e))?;
    let source = String::from_utf8_lossy(&bytes);
    Ok(Document::parse(&source))
}

/// Serialize `document` and overwrite the file at `path`.
pub fn save(path: &Path, document: &Document) -> EditorResult<()> {
    let html = document.to_html()?;
    debug!(path = %path.display(), bytes = html.len(), "saving HTML file");
    atomic_write(path, &html).map_err(|e| EditorError::io(path, e))
}

/// Write a new page from `template`. Never touches an existing file.
pub fn create(path: &Path, template: &PageTemplate<'_>) -> EditorResult<()> {
    if path.exists() {
        return Err(EditorError::AlreadyExists {
            path: path.to_path_buf(),
        });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| EditorError::io(parent, e))?;
    }
    atomic_create(path, &template.render()).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => EditorError::AlreadyExists {
            path: path.to_path_buf(),
        },
        _ => EditorError::io(path, e),
    })?;
    info!(path = %path.display(), "created HTML file");
    Ok(())
}
