//! Create tool: write a new HTML5 page from the built-in skeleton.

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

use super::Workspace;
use crate::html::template::PageTemplate;
use crate::server::{ToolCallResult, ToolDefinition};
use crate::storage;

pub const NAME: &str = "create_file";

/// Parameters for the create tool.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFileParams {
    /// Path of the file to create.
    pub file: String,
    #[serde(default = "default_title")]
    pub title: String,
    /// Value of `<html lang>`.
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_charset")]
    pub charset: String,
    /// Link the Bootstrap 5 stylesheet and script bundle.
    #[serde(default)]
    pub include_bootstrap: bool,
    /// Initial body markup, written verbatim.
    #[serde(default)]
    pub content: String,
}

fn default_title() -> String {
    "Yeni Sayfa".to_owned()
}

fn default_language() -> String {
    "tr".to_owned()
}

fn default_charset() -> String {
    "UTF-8".to_owned()
}

impl CreateFileParams {
    pub fn template(&self) -> PageTemplate<'_> {
        PageTemplate {
            title: &self.title,
            language: &self.language,
            charset: &self.charset,
            include_bootstrap: self.include_bootstrap,
            content: &self.content,
        }
    }
}

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: NAME.to_owned(),
        description: "Create a new HTML file from a basic HTML5 template with title, language, \
            charset, optional Bootstrap and initial body content. Fails if the file exists."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file": {
                    "type": "string",
                    "description": "Path of the HTML file to create (absolute or relative)"
                },
                "title": {
                    "type": "string",
                    "description": "Page title (title tag)",
                    "default": "Yeni Sayfa"
                },
                "language": {
                    "type": "string",
                    "description": "Page language (html lang attribute)",
                    "default": "tr"
                },
                "charset": {
                    "type": "string",
                    "description": "Character encoding",
                    "default": "UTF-8"
                },
                "includeBootstrap": {
                    "type": "boolean",
                    "description": "Include Bootstrap CSS and JS",
                    "default": false
                },
                "content": {
                    "type": "string",
                    "description": "Initial markup placed inside body",
                    "default": ""
                }
            },
            "required": ["file"]
        }),
    }
}

pub fn execute(workspace: &Workspace, arguments: serde_json::Value) -> Result<ToolCallResult> {
    let params: CreateFileParams = super::parse_args(NAME, arguments)?;
    let path = workspace.resolve(&params.file)?;

    storage::create(&path, &params.template())?;

    info!(
        path = %path.display(),
        title = params.title.as_str(),
        bootstrap = params.include_bootstrap,
        "file created"
    );
    Ok(ToolCallResult::text(format!(
        "Created HTML file: {}",
        path.display()
    )))
}
