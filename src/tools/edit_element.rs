//! Edit tool: change an existing element's text, attributes and styles.

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use tracing::info;

use super::Workspace;
use crate::error::EditorResult;
use crate::html::{Document, node};
use crate::server::{ToolCallResult, ToolDefinition};
use crate::{storage, style};

pub const NAME: &str = "edit_element";

/// Requested change to an element's text content.
///
/// An absent or `null` value keeps the current content; an empty string
/// clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TextContent {
    #[default]
    Keep,
    Clear,
    Replace(String),
}

impl<'de> Deserialize<'de> for TextContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<String>::deserialize(deserializer)? {
            None => Self::Keep,
            Some(text) if text.is_empty() => Self::Clear,
            Some(text) => Self::Replace(text),
        })
    }
}

/// Parameters for the edit tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditElementParams {
    pub file: String,
    /// Selector of the element to edit.
    pub selector: String,
    #[serde(default)]
    pub content: TextContent,
    /// Attributes to set or overwrite.
    #[serde(default)]
    pub attributes: IndexMap<String, serde_json::Value>,
    /// Inline styles merged into the existing `style` attribute.
    #[serde(default)]
    pub styles: IndexMap<String, serde_json::Value>,
    /// Attribute names to remove.
    #[serde(default)]
    pub remove_attributes: Vec<String>,
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Edit an existing element in an HTML file. Replaces its text content, \
            sets or removes attributes, and merges inline styles into its current style."
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
                    "description": "CSS selector of the element to edit (e.g. #button1, .container, h1)"
                },
                "content": {
                    "type": ["string", "null"],
                    "description": "New text content. Omit or pass null to keep it; pass \"\" to clear it.",
                    "default": null
                },
                "attributes": {
                    "type": "object",
                    "description": "Attributes to add or change",
                    "additionalProperties": true,
                    "default": {}
                },
                "styles": {
                    "type": "object",
                    "description": "Inline CSS styles to add or change; other declarations are kept",
                    "additionalProperties": true,
                    "default": {}
                },
                "removeAttributes": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Names of attributes to remove",
                    "default": []
                }
            },
            "required": ["file", "selector"]
        }),
    }
}

/// Apply the edits to the first element matching `params.selector`.
///
/// Order: content, attribute set, attribute removal, style merge.
pub fn apply(document: &Document, params: &EditElementParams) -> EditorResult<()> {
    for name in params.attributes.keys() {
        super::validate_attribute_name(NAME, name)?;
    }

    let element = document.require(&params.selector)?;

    match &params.content {
        TextContent::Keep => {}
        TextContent::Clear => node::set_text_content(&element, ""),
        TextContent::Replace(text) => node::set_text_content(&element, text),
    }
    for (name, value) in super::text_map(&params.attributes) {
        node::set_attribute(&element, &name, &value);
    }
    for name in &params.remove_attributes {
        node::remove_attribute(&element, name);
    }
    if !params.styles.is_empty() {
        let current = node::attribute(&element, "style").unwrap_or_default();
        let merged = style::merge_style(&current, super::text_map(&params.styles));
        node::set_attribute(&element, "style", &merged);
    }
    Ok(())
}

pub fn execute(workspace: &Workspace, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: EditElementParams = super::parse_args(NAME, arguments)?;
    let path = workspace.resolve(&params.file)?;

    let document = storage::load(&path)?;
    apply(&document, &params)?;
    storage::save(&path, &document)?;

    info!(path = %path.display(), selector = params.selector.as_str(), "element edited");
    Ok(ToolCallResult::text(format!(
        "Element \"{}\" updated.",
        params.selector
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const PAGE: &str = "<body><p id=\"t\" class=\"old\" title=\"x\" \
        style=\"color: red; font-size: 12px;\">Hello</p></body>";

    fn params(value: serde_json::Value) -> EditElementParams {
        serde_json::from_value(value).expect("params")
    }

    fn target(doc: &Document) -> markup5ever_rcdom::Handle {
        doc.require("#t").expect("target")
    }

    #[test]
    fn test_content_tri_state() {
        assert_eq!(params(json!({"file": "a", "selector": "p"})).content, TextContent::Keep);
        assert_eq!(
            params(json!({"file": "a", "selector": "p", "content": null})).content,
            TextContent::Keep
        );
        assert_eq!(
            params(json!({"file": "a", "selector": "p", "content": ""})).content,
            TextContent::Clear
        );
        assert_eq!(
            params(json!({"file": "a", "selector": "p", "content": "hi"})).content,
            TextContent::Replace("hi".to_owned())
        );
    }

    #[test]
    fn test_omitted_content_keeps_text() {
        let doc = Document::parse(PAGE);
        apply(&doc, &params(json!({"file": "a", "selector": "#t", "attributes": {"lang": "en"}})))
            .expect("apply");
        assert_eq!(node::text_content(&target(&doc)), "Hello");
    }

    #[test]
    fn test_empty_content_clears_text() {
        let doc = Document::parse(PAGE);
        apply(&doc, &params(json!({"file": "a", "selector": "#t", "content": ""}))).expect("apply");
        assert_eq!(node::text_content(&target(&doc)), "");
    }

    #[test]
    fn test_attributes_set_then_removed() {
        let doc = Document::parse(PAGE);
        apply(
            &doc,
            &params(json!({
                "file": "a",
                "selector": "#t",
                "attributes": {"class": "new", "data-x": "1"},
                "removeAttributes": ["title", "data-x", "missing"]
            })),
        )
        .expect("apply");
        let p = target(&doc);
        assert_eq!(node::attribute(&p, "class").as_deref(), Some("new"));
        assert_eq!(node::attribute(&p, "title"), None);
        assert_eq!(node::attribute(&p, "data-x"), None);
    }

    #[test]
    fn test_style_merge_preserves_existing() {
        let doc = Document::parse(PAGE);
        apply(
            &doc,
            &params(json!({"file": "a", "selector": "#t", "styles": {"backgroundColor": "blue"}})),
        )
        .expect("apply");
        assert_eq!(
            node::attribute(&target(&doc), "style").as_deref(),
            Some("color: red; font-size: 12px; background-color: blue; ")
        );
    }

    #[test]
    fn test_style_merge_idempotent() {
        let doc = Document::parse("<body><p id=\"t\">x</p></body>");
        let edit = params(json!({"file": "a", "selector": "#t", "styles": {"color": "red"}}));
        apply(&doc, &edit).expect("first");
        let once = node::attribute(&target(&doc), "style");
        apply(&doc, &edit).expect("second");
        assert_eq!(node::attribute(&target(&doc), "style"), once);
        assert_eq!(once.as_deref(), Some("color: red; "));
    }

    #[test]
    fn test_missing_target() {
        let doc = Document::parse(PAGE);
        let err = apply(&doc, &params(json!({"file": "a", "selector": ".none"})))
            .expect_err("should fail");
        assert!(matches!(err, crate::EditorError::TargetNotFound { .. }));
    }
}
