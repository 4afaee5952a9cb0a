//! Add tool: append a new element under a parent selected by CSS selector.

use anyhow::Result;
use indexmap::IndexMap;
use serde::Deserialize;
use tracing::info;

use super::Workspace;
use crate::error::EditorResult;
use crate::html::{Document, node};
use crate::server::{ToolCallResult, ToolDefinition};
use crate::{storage, style};

pub const NAME: &str = "add_element";

/// Parameters for the add tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddElementParams {
    /// Path to the HTML file.
    pub file: String,
    /// Tag name of the new element.
    pub element: String,
    /// Text content; empty means none.
    #[serde(default)]
    pub content: String,
    /// Selector of the parent to append to.
    #[serde(default = "default_parent_selector")]
    pub parent_selector: String,
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
    /// Inline styles, camelCase or kebab-case property names.
    #[serde(default)]
    pub styles: IndexMap<String, serde_json::Value>,
}

fn default_parent_selector() -> String {
    "body".to_owned()
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Add a new element (button, heading, paragraph, div, ...) to an HTML file. \
            The element is appended as the last child of the parent matched by parentSelector, \
            with optional text content, attributes and inline styles."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file": {
                    "type": "string",
                    "description": "Path to the HTML file (absolute or relative)"
                },
                "element": {
                    "type": "string",
                    "description": "Tag name of the element to add (button, div, h1, p, ...)"
                },
                "content": {
                    "type": "string",
                    "description": "Text content of the element",
                    "default": ""
                },
                "parentSelector": {
                    "type": "string",
                    "description": "CSS selector of the parent element (e.g. #container, .content)",
                    "default": "body"
                },
                "attributes": {
                    "type": "object",
                    "description": "Attributes to set on the element (id, class, ...)",
                    "additionalProperties": true,
                    "default": {}
                },
                "styles": {
                    "type": "object",
                    "description": "Inline CSS styles, e.g. {\"backgroundColor\": \"blue\"}",
                    "additionalProperties": true,
                    "default": {}
                }
            },
            "required": ["file", "element"]
        }),
    }
}

/// Build the element described by `params` and append it to its parent.
pub fn apply(document: &Document, params: &AddElementParams) -> EditorResult<()> {
    super::validate_tag_name(NAME, &params.element)?;
    for name in params.attributes.keys() {
        super::validate_attribute_name(NAME, name)?;
    }

    let parent = document.require(&params.parent_selector)?;
    let element = node::create_element(&params.element);

    if !params.content.is_empty() {
        node::set_text_content(&element, &params.content);
    }
    for (name, value) in super::text_map(&params.attributes) {
        node::set_attribute(&element, &name, &value);
    }
    if !params.styles.is_empty() {
        let style = style::build_style(super::text_map(&params.styles));
        node::set_attribute(&element, "style", &style);
    }

    node::append_child(&parent, &element);
    Ok(())
}

pub fn execute(workspace: &Workspace, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: AddElementParams = super::parse_args(NAME, arguments)?;
    let path = workspace.resolve(&params.file)?;

    let document = storage::load(&path)?;
    apply(&document, &params)?;
    storage::save(&path, &document)?;

    info!(
        path = %path.display(),
        element = params.element.as_str(),
        parent = params.parent_selector.as_str(),
        "element added"
    );
    Ok(ToolCallResult::text(format!(
        "Element \"{}\" added to \"{}\".",
        params.element, params.parent_selector
    )))
}
