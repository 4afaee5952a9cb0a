//! `html-editor-mcp`: MCP server for editing HTML documents on disk.
//!
//! Exposes five tools over the Model Context Protocol (MCP) on stdio
//! (JSON-RPC 2.0, newline-delimited). Every call loads the target file,
//! applies one DOM operation, and writes the whole document back.
//!
//! # Tools
//!
//! - `create_file`: new page from an HTML5 skeleton
//! - `add_element`: append an element under a selected parent
//! - `edit_element`: change text, attributes and inline styles
//! - `view`: markup of a file or of one selected element
//! - `delete_element`: remove a selected element
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → McpServer → ToolRouter → tools::* → storage ⇄ disk
//!                                                  ↓
//!                                    html (html5ever DOM, selectors), style
//! stdout (JSON-RPC) ←───────────────────────────────┘
//! ```

pub mod error;
pub mod html;
pub mod logging;
pub mod server;
pub mod storage;
pub mod style;
pub mod tools;
pub mod util;

pub use error::{EditorError, EditorResult};
pub use server::run_mcp_server;
