//! Tool router: registers and dispatches the HTML editing tools.
//!
//! Each tool module exposes a `tool_definition()` for `tools/list` and an
//! `execute()` taking the resolved [`Workspace`] and the raw JSON arguments.
//! Tool failures are returned as errors; the server turns them into
//! `isError` results.

pub mod add_element;
pub mod create_file;
pub mod delete_element;
pub mod edit_element;
pub mod view;

use std::path::{Path, PathBuf};

use anyhow::Result;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{EditorError, EditorResult};
use crate::server::{ToolCallResult, ToolDefinition};

/// Prefix of the tool names used by earlier releases, still accepted on
/// `tools/call`.
const LEGACY_PREFIX: &str = "html_";

/// Root that relative file paths resolve against.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    confined: bool,
}

impl Workspace {
    pub fn new(root: PathBuf, confined: bool) -> Self {
        Self { root, confined }
    }

    /// Resolve `file_path` to an absolute path.
    ///
    /// Relative paths are joined onto the workspace root. Existing paths are
    /// canonicalized; for paths still to be created, the deepest existing
    /// ancestor is canonicalized and the remainder appended. When the
    /// workspace is confined, the result must stay inside the root.
    pub fn resolve(&self, file_path: &str) -> EditorResult<PathBuf> {
        if file_path.is_empty() {
            return Err(EditorError::invalid_arguments("file", "path is empty"));
        }
        // Null bytes can bypass C-based path APIs.
        if file_path.contains('\0') {
            return Err(EditorError::invalid_arguments("file", "path contains null byte"));
        }

        let raw_path = if Path::new(file_path).is_absolute() {
            PathBuf::from(file_path)
        } else {
            self.root.join(file_path)
        };
        let resolved = canonicalize_lenient(&raw_path)?;

        if self.confined {
            let canonical_root = self
                .root
                .canonicalize()
                .unwrap_or_else(|_| self.root.clone());
            if !resolved.starts_with(&canonical_root) {
                return Err(EditorError::OutsideWorkspace {
                    path: file_path.to_owned(),
                });
            }
        }

        Ok(resolved)
    }
}

/// Canonicalize `path`, tolerating a missing tail.
fn canonicalize_lenient(path: &Path) -> EditorResult<PathBuf> {
    if path.exists() {
        return path.canonicalize().map_err(|e| EditorError::io(path, e));
    }

    let mut ancestor = path.to_path_buf();
    let mut suffix_parts = Vec::new();
    loop {
        if ancestor.exists() {
            let mut result = ancestor
                .canonicalize()
                .map_err(|e| EditorError::io(&ancestor, e))?;
            for part in suffix_parts.iter().rev() {
                result.push(part);
            }
            return Ok(result);
        }
        match (ancestor.file_name(), ancestor.parent()) {
            (Some(name), Some(parent)) => {
                suffix_parts.push(name.to_os_string());
                ancestor = parent.to_path_buf();
            }
            _ => return Ok(path.to_path_buf()),
        }
    }
}

/// Deserialize tool arguments, mapping any shape error to `InvalidArguments`.
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, arguments: serde_json::Value) -> EditorResult<T> {
    serde_json::from_value(arguments).map_err(|e| EditorError::invalid_arguments(tool, e))
}

/// Text form of an attribute or style value. Strings pass through, other
/// JSON scalars use their JSON spelling.
pub(crate) fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Stringify every value of an argument map, keeping key order.
pub(crate) fn text_map(map: &IndexMap<String, serde_json::Value>) -> IndexMap<String, String> {
    map.iter()
        .map(|(key, value)| (key.clone(), value_text(value)))
        .collect()
}

/// Check that `tag` is usable as an element name.
pub(crate) fn validate_tag_name(tool: &str, tag: &str) -> EditorResult<()> {
    let mut chars = tag.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'));
    if valid {
        Ok(())
    } else {
        Err(EditorError::invalid_arguments(
            tool,
            format!("invalid element name {tag:?}"),
        ))
    }
}

/// Check that `name` is usable as an attribute name.
pub(crate) fn validate_attribute_name(tool: &str, name: &str) -> EditorResult<()> {
    let valid = !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        });
    if valid {
        Ok(())
    } else {
        Err(EditorError::invalid_arguments(
            tool,
            format!("invalid attribute name {name:?}"),
        ))
    }
}

/// Tool router that dispatches MCP tool calls to implementations.
pub struct ToolRouter {
    workspace: Workspace,
}

impl ToolRouter {
    /// Create a router resolving paths against `workspace`.
    pub fn new(workspace: PathBuf, restrict_to_workspace: bool) -> Self {
        Self {
            workspace: Workspace::new(workspace, restrict_to_workspace),
        }
    }

    /// List all available tools with their JSON Schema definitions.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        vec![
            create_file::tool_definition(),
            add_element::tool_definition(),
            edit_element::tool_definition(),
            view::tool_definition(),
            delete_element::tool_definition(),
        ]
    }

    /// Call a tool by name with the given JSON arguments.
    ///
    /// An unknown name is not an error: it yields an `isError` result.
    ///
    /// # Errors
    ///
    /// Returns the tool's failure (bad arguments, missing file or element,
    /// I/O).
    pub fn call_tool(&self, name: &str, arguments: serde_json::Value) -> Result<ToolCallResult> {
        debug!(tool = name, "dispatching tool call");

        match name.strip_prefix(LEGACY_PREFIX).unwrap_or(name) {
            create_file::NAME => create_file::execute(&self.workspace, arguments),
            add_element::NAME => add_element::execute(&self.workspace, arguments),
            edit_element::NAME => edit_element::execute(&self.workspace, arguments),
            view::NAME => view::execute(&self.workspace, arguments),
            delete_element::NAME => delete_element::execute(&self.workspace, arguments),
            _ => Ok(ToolCallResult::error(
                EditorError::UnknownOperation(name.to_owned()).to_string(),
            )),
        }
    }
}
