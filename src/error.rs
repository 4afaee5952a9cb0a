//! Error types for the html-editor-mcp crate.

use std::path::PathBuf;

/// Editor-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Required argument missing or of the wrong primitive type.
    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    /// File to load does not exist.
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// File to create already exists.
    #[error("file already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// Selector matched no element.
    #[error("no element matches selector: {selector}")]
    TargetNotFound { selector: String },

    /// Selector could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// Resolved path is outside the workspace root.
    #[error("path escapes workspace boundary: {path}")]
    OutsideWorkspace { path: String },

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Markup serialization failed.
    #[error("failed to serialize document: {0}")]
    Serialize(#[source] std::io::Error),

    /// Tool name not recognized.
    #[error("Unknown tool: {0}")]
    UnknownOperation(String),
}

impl EditorError {
    pub(crate) fn invalid_arguments(tool: &str, reason: impl std::fmt::Display) -> Self {
        Self::InvalidArguments {
            tool: tool.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience result type for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;
