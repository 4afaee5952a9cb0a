//! Delete tool: remove an element and its subtree.

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use super::Workspace;
use crate::error::{EditorError, EditorResult};
use crate::html::{Document, node};
use crate::server::{ToolCallResult, ToolDefinition};
use crate::storage;

pub const NAME: &str = "delete_element";

/// Parameters for the delete tool.
#[derive(Debug, Deserialize)]
pub struct DeleteElementParams {
    pub file: String,
    /// Selector of the element to remove.
    pub selector: String,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Delete the first element matching a CSS selector from an HTML file."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file": {
                    "type": "string",
                    "description": "Path to the HTML file (absolute or relative)"
                },
                "selector": {
                    "type": "string",
                    "description": "CSS selector of the element to delete"
                }
            },
            "required": ["file", "selector"]
        }),
    }
}

/// Detach the first element matching `selector`.
///
/// An element without a parent cannot be removed and counts as not found.
pub fn apply(document: &Document, selector: &str) -> EditorResult<()> {
    let element = document.require(selector)?;
    if node::detach(&element) {
        Ok(())
    } else {
        Err(EditorError::TargetNotFound {
            selector: selector.to_owned(),
        })
    }
}

pub fn execute(workspace: &Workspace, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: DeleteElementParams = super::parse_args(NAME, arguments)?;
    let path = workspace.resolve(&params.file)?;

    let document = storage::load(&path)?;
    apply(&document, &params.selector)?;
    storage::save(&path, &document)?;

    info!(path = %path.display(), selector = params.selector.as_str(), "element deleted");
    Ok(ToolCallResult::text(format!(
        "Element \"{}\" deleted.",
        params.selector
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_removes_subtree() {
        let doc = Document::parse("<body><div id=\"d\"><p>x</p></div><p id=\"keep\">y</p></body>");
        apply(&doc, "#d").expect("delete");
        assert!(doc.query_selector("#d").expect("valid").is_none());
        assert!(doc.query_selector("div p").expect("valid").is_none());
        assert!(doc.query_selector("#keep").expect("valid").is_some());
    }

    #[test]
    fn test_delete_only_first_match() {
        let doc = Document::parse("<body><p class=\"x\">1</p><p class=\"x\">2</p></body>");
        apply(&doc, ".x").expect("delete");
        let rest = doc.require(".x").expect("remaining");
        assert_eq!(node::text_content(&rest), "2");
    }

    #[test]
    fn test_delete_missing() {
        let doc = Document::parse("<body></body>");
        let err = apply(&doc, "#gone").expect_err("should fail");
        assert!(matches!(err, EditorError::TargetNotFound { .. }));
    }
}
