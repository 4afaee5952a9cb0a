//! html-editor-mcp -- standalone MCP server for HTML file editing.
//!
//! Usage: html-editor-mcp [--workspace <dir>] [--log-file <path>] [--restrict-to-workspace]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use html_editor_mcp::server::McpServerConfig;

#[derive(Debug, Parser)]
#[command(name = "html-editor-mcp", version, about = "MCP server for editing HTML files")]
struct Cli {
    /// Directory that relative file paths resolve against.
    #[arg(long, env = "HTML_EDITOR_WORKSPACE", default_value = ".")]
    workspace: PathBuf,

    /// Append a timestamped record of every request and result to this file.
    #[arg(long, env = "HTML_EDITOR_LOG_FILE")]
    log_file: Option<PathBuf>,

    /// Reject file paths that resolve outside the workspace.
    #[arg(long, env = "HTML_EDITOR_RESTRICT")]
    restrict_to_workspace: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    html_editor_mcp::logging::init(cli.log_file.as_deref());

    let workspace = cli
        .workspace
        .canonicalize()
        .with_context(|| format!("invalid workspace {}", cli.workspace.display()))?;

    let config = McpServerConfig {
        workspace,
        restrict_to_workspace: cli.restrict_to_workspace,
    };

    html_editor_mcp::run_mcp_server(config)
}
