//! MCP server over stdio: newline-delimited JSON-RPC 2.0.
//!
//! Each frame from the client yields at most one reply line. Nothing the
//! client sends ends the session except closing stdin: undecodable or
//! oversize lines, bad envelopes and unknown methods all get JSON-RPC
//! errors, and tool failures are `isError` results.
//!
//! Protocol flow:
//! 1. Client sends `initialize`; server responds with capabilities
//! 2. Client sends `notifications/initialized`
//! 3. Client sends `tools/list`; server returns the HTML tool definitions
//! 4. Client sends `tools/call`; server runs the tool and returns its text
//! 5. Client closes stdin; server exits

pub mod framing;
pub mod protocol;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::tools::ToolRouter;
use framing::{Frame, LineReader};
pub use protocol::{
    ContentItem, ErrorCode, JsonRpcError, JsonRpcRequest, JsonRpcResponse, ToolCallResult,
    ToolDefinition,
};
use protocol::{
    InitializeResult, PROTOCOL_VERSION, ServerCapabilities, ServerInfo, ToolCallParams,
    ToolsCapability, ToolsListResult,
};

/// Largest accepted request line (10 MiB).
pub const MAX_FRAME_BYTES: usize = 10 * 1024 * 1024;

const SERVER_NAME: &str = "html-editor-mcp";

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Base directory that relative file paths resolve against.
    pub workspace: PathBuf,
    /// Reject paths that resolve outside `workspace`.
    pub restrict_to_workspace: bool,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            restrict_to_workspace: false,
        }
    }
}

/// Run the MCP server on stdin/stdout until stdin is closed.
///
/// # Errors
///
/// Returns an error if stdin/stdout I/O fails.
pub fn run_mcp_server(config: McpServerConfig) -> Result<()> {
    info!(
        workspace = %config.workspace.display(),
        restrict_to_workspace = config.restrict_to_workspace,
        "html-editor-mcp server starting"
    );

    let router = ToolRouter::new(config.workspace, config.restrict_to_workspace);
    let stdin = std::io::stdin();
    serve(&router, stdin.lock(), std::io::stdout().lock())?;

    info!("html-editor-mcp server stopped");
    Ok(())
}

/// Serve requests from `reader` until EOF, writing replies to `writer`.
///
/// # Errors
///
/// Only transport I/O failures end the loop with an error.
pub fn serve(router: &ToolRouter, reader: impl BufRead, writer: impl Write) -> Result<()> {
    serve_frames(router, LineReader::new(reader, MAX_FRAME_BYTES), writer)
}

fn serve_frames<R: BufRead>(
    router: &ToolRouter,
    mut frames: LineReader<R>,
    mut writer: impl Write,
) -> Result<()> {
    loop {
        let reply = match frames.next_frame().context("failed to read from client")? {
            Frame::Eof => {
                info!("stdin closed, shutting down");
                return Ok(());
            }
            Frame::Line(line) if line.trim().is_empty() => continue,
            Frame::Line(line) => handle_line(router, &line),
            Frame::Malformed(reason) => {
                warn!(%reason, "request is not UTF-8");
                Some(JsonRpcResponse::failure(
                    None,
                    ErrorCode::ParseError,
                    format!("parse error: {reason}"),
                ))
            }
            Frame::Oversize { limit } => {
                warn!(limit, "request line too long, skipped");
                Some(JsonRpcResponse::failure(
                    None,
                    ErrorCode::InvalidRequest,
                    format!("invalid request: line exceeds {limit} bytes"),
                ))
            }
        };

        if let Some(reply) = reply {
            write_message(&mut writer, &reply)?;
        }
    }
}

/// Decode one line and produce its reply; `None` for notifications.
fn handle_line(router: &ToolRouter, line: &str) -> Option<JsonRpcResponse> {
    debug!(raw = line, "received request");

    let value: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "invalid JSON");
            return Some(JsonRpcResponse::failure(
                None,
                ErrorCode::ParseError,
                format!("parse error: {e}"),
            ));
        }
    };
    let id = value.get("id").filter(|id| !id.is_null()).cloned();

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "not a JSON-RPC request");
            return Some(JsonRpcResponse::failure(
                id,
                ErrorCode::InvalidRequest,
                format!("invalid request: {e}"),
            ));
        }
    };
    if request.jsonrpc != protocol::JSONRPC_VERSION {
        warn!(version = request.jsonrpc, "unsupported JSON-RPC version");
        return Some(JsonRpcResponse::failure(
            request.id,
            ErrorCode::InvalidRequest,
            format!("invalid request: jsonrpc must be \"2.0\", got {:?}", request.jsonrpc),
        ));
    }

    if request.is_notification() {
        debug!(method = request.method, "notification");
        if request.method == "notifications/initialized" {
            info!("client initialized");
        }
        return None;
    }

    let reply = match dispatch(router, &request) {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err((code, message)) => {
            warn!(method = request.method, code = code.code(), %message, "request failed");
            JsonRpcResponse::failure(request.id, code, message)
        }
    };
    Some(reply)
}

type MethodResult = std::result::Result<Value, (ErrorCode, String)>;

fn dispatch(router: &ToolRouter, request: &JsonRpcRequest) -> MethodResult {
    match request.method.as_str() {
        "initialize" => to_result(&InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME,
                version: env!("CARGO_PKG_VERSION"),
            },
        }),
        "ping" => Ok(serde_json::json!({})),
        "tools/list" => to_result(&ToolsListResult {
            tools: router.list_tools(),
        }),
        "tools/call" => call_tool(router, &request.params),
        other => Err((ErrorCode::MethodNotFound, format!("method not found: {other}"))),
    }
}

/// Run a tool. Whatever the tool reports, including its failure, is a
/// successful JSON-RPC reply.
fn call_tool(router: &ToolRouter, params: &Value) -> MethodResult {
    let params: ToolCallParams = serde_json::from_value(params.clone()).map_err(|e| {
        (
            ErrorCode::InvalidParams,
            format!("invalid tools/call params: {e}"),
        )
    })?;

    info!(tool = params.name.as_str(), arguments = %params.arguments, "tool call");
    let result = router
        .call_tool(&params.name, params.arguments)
        .unwrap_or_else(|e| {
            error!(tool = params.name.as_str(), error = %format!("{e:#}"), "tool call failed");
            ToolCallResult::error(format!("Error: {e}"))
        });
    info!(
        tool = params.name.as_str(),
        is_error = result.is_error,
        chars = result.first_text().len(),
        "tool result"
    );

    to_result(&result)
}

fn to_result(payload: &impl Serialize) -> MethodResult {
    serde_json::to_value(payload).map_err(|e| {
        (
            ErrorCode::InternalError,
            format!("internal error: failed to serialize result: {e}"),
        )
    })
}

fn write_message(out: &mut impl Write, message: &JsonRpcResponse) -> Result<()> {
    let mut line = serde_json::to_vec(message).context("failed to serialize response")?;
    line.push(b'\n');
    out.write_all(&line).context("failed to write response")?;
    out.flush().context("failed to flush response")
}
