//! View tool: return the markup of a whole file or one element.

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use super::Workspace;
use crate::error::EditorResult;
use crate::html::{Document, node};
use crate::server::{ToolCallResult, ToolDefinition};
use crate::storage;

pub const NAME: &str = "view";

/// Parameters for the view tool.
#[derive(Debug, Deserialize)]
pub struct ViewParams {
    pub file: String,
    /// Element to show; `None` shows the whole document.
    #[serde(default)]
    pub selector: Option<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Show the contents of an HTML file, or only the element matched by a selector. \
            Never modifies the file."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file": {
                    "type": "string",
                    "description": "Path to the HTML file (absolute or relative)"
                },
                "selector": {
                    "type": ["string", "null"],
                    "description": "CSS selector of the element to show. Omit or leave empty to show the whole file.",
                    "default": null
                }
            },
            "required": ["file"]
        }),
    }
}

/// Markup of the selected element, or of the whole document when no
/// selector (or an empty one) is given.
pub fn render(document: &Document, selector: Option<&str>) -> EditorResult<String> {
    match selector.filter(|s| !s.is_empty()) {
        Some(selector) => node::outer_html(&document.require(selector)?),
        None => document.to_html(),
    }
}

pub fn execute(workspace: &Workspace, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: ViewParams = super::parse_args(NAME, arguments)?;
    let path = workspace.resolve(&params.file)?;

    let document = storage::load(&path)?;
    let markup = render(&document, params.selector.as_deref())?;

    info!(path = %path.display(), chars = markup.len(), "file viewed");
    Ok(ToolCallResult::text(markup))
}
