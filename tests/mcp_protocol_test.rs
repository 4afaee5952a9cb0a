//! MCP protocol integration tests.
//!
//! Exercises the JSON-RPC types, a full stdio session over in-memory
//! buffers, and the HTML tools end to end through the router.

use std::io::BufReader;
use std::path::Path;

use html_editor_mcp::EditorError;
use html_editor_mcp::server::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, serve};
use html_editor_mcp::tools::ToolRouter;
use serde_json::{Value, json};

fn router(dir: &Path) -> ToolRouter {
    ToolRouter::new(dir.to_path_buf(), false)
}

fn call_ok(router: &ToolRouter, name: &str, arguments: Value) -> String {
    let result = router
        .call_tool(name, arguments)
        .unwrap_or_else(|e| panic!("{name} failed: {e:#}"));
    assert!(!result.is_error, "{name} returned error: {}", result.first_text());
    result.first_text().to_owned()
}

fn call_err(router: &ToolRouter, name: &str, arguments: Value) -> anyhow::Error {
    match router.call_tool(name, arguments) {
        Ok(result) => panic!("{name} should fail, got: {}", result.first_text()),
        Err(e) => e,
    }
}

fn editor_error(err: &anyhow::Error) -> &EditorError {
    err.downcast_ref::<EditorError>()
        .unwrap_or_else(|| panic!("not an EditorError: {err:#}"))
}

#[test]
fn test_json_rpc_request_parsing() {
    let req_json = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "tools/call",
        "params": {
            "name": "view",
            "arguments": { "file": "index.html" }
        }
    });

    let req: JsonRpcRequest = serde_json::from_value(req_json).expect("should parse request");

    assert_eq!(req.method, "tools/call");
    assert_eq!(req.id, Some(json!(1)));
    assert_eq!(req.params["arguments"]["file"], "index.html");
}

#[test]
fn test_json_rpc_error_response() {
    let resp = JsonRpcResponse {
        jsonrpc: "2.0".to_owned(),
        id: Some(json!(2)),
        result: None,
        error: Some(JsonRpcError {
            code: -32601,
            message: "method not found".to_owned(),
            data: None,
        }),
    };

    let json_str = serde_json::to_string(&resp).expect("should serialize");
    assert!(json_str.contains("-32601"));
    assert!(!json_str.contains("result"));
}

#[test]
fn test_tool_definitions_complete() {
    let router = router(Path::new("/tmp"));

    let tools = router.list_tools();
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(
        names,
        ["create_file", "add_element", "edit_element", "view", "delete_element"]
    );

    for tool in &tools {
        assert!(!tool.description.is_empty(), "tool {} missing description", tool.name);
        assert_eq!(tool.input_schema["type"], "object", "tool {}", tool.name);
        let required = tool.input_schema["required"].as_array().expect("required");
        assert!(required.contains(&json!("file")), "tool {} must require file", tool.name);
    }
}

#[test]
fn test_stdio_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    let input = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call",
               "params": {"name": "create_file", "arguments": {"file": "s.html", "title": "Session"}}}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "tools/call",
               "params": {"name": "view", "arguments": {"file": "missing.html"}}}),
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call",
               "params": {"name": "bogus", "arguments": {}}}),
        json!({"jsonrpc": "2.0", "id": 6, "method": "resources/list"}),
    ]
    .iter()
    .map(Value::to_string)
    .chain(["", "not json"].map(str::to_owned))
    .collect::<Vec<_>>()
    .join("\n");

    let mut output = Vec::new();
    serve(&router, input.as_bytes(), &mut output).expect("serve");

    let responses: Vec<Value> = String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("response json"))
        .collect();
    assert_eq!(responses.len(), 7, "notification must not be answered");

    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "html-editor-mcp");
    assert_eq!(responses[0]["result"]["protocolVersion"], "2025-06-18");
    assert_eq!(responses[1]["result"]["tools"].as_array().map(Vec::len), Some(5));

    let created = &responses[2]["result"];
    assert!(created.get("isError").is_none());
    assert!(created["content"][0]["text"].as_str().expect("text").contains("s.html"));

    let missing = &responses[3]["result"];
    assert_eq!(missing["isError"], true);
    assert!(missing["content"][0]["text"].as_str().expect("text").contains("file not found"));

    assert_eq!(responses[4]["result"]["isError"], true);
    assert!(responses[4]["result"]["content"][0]["text"]
        .as_str()
        .expect("text")
        .contains("Unknown tool: bogus"));

    assert_eq!(responses[5]["error"]["code"], -32601);
    assert_eq!(responses[6]["error"]["code"], -32700);
}

#[test]
fn test_multibyte_character_on_buffer_boundary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    let head = r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"create_file","arguments":{"file":"u.html","title":""#;
    let title = format!("{}ş", "a".repeat(8191 - head.len()));
    let request = format!("{head}{title}\"}}}}}}\n");
    assert_eq!(request.find('ş'), Some(8191));

    let mut output = Vec::new();
    serve(&router, BufReader::with_capacity(8192, request.as_bytes()), &mut output).expect("serve");

    let reply: Value = serde_json::from_slice(&output).expect("reply json");
    assert_eq!(reply["id"], 1);
    assert!(reply["result"].get("isError").is_none(), "unexpected failure: {reply}");

    let html = call_ok(&router, "view", json!({"file": "u.html", "selector": "title"}));
    assert_eq!(html, format!("<title>{title}</title>"));
}

#[test]
fn test_invalid_utf8_line_gets_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    let mut input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\",\"x\":\"\xff\"}\n".to_vec();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

    let mut output = Vec::new();
    serve(&router, input.as_slice(), &mut output).expect("serve");

    let replies: Vec<Value> = String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("reply json"))
        .collect();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[1]["id"], 2);
    assert_eq!(replies[1]["result"], json!({}));
}

#[test]
fn test_view_empty_selector_shows_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    call_ok(&router, "create_file", json!({"file": "a.html", "title": "Whole"}));
    let whole = call_ok(&router, "view", json!({"file": "a.html"}));
    let empty = call_ok(&router, "view", json!({"file": "a.html", "selector": ""}));
    assert_eq!(empty, whole);
    assert!(empty.contains("<title>Whole</title>"));
}

#[test]
fn test_create_then_view_title() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    call_ok(&router, "create_file", json!({"file": "a.html", "title": "T"}));
    let html = call_ok(&router, "view", json!({"file": "a.html"}));

    assert!(html.contains("<title>T</title>"));
    assert!(html.contains("lang=\"tr\""));
}

#[test]
fn test_add_then_view_element() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    call_ok(&router, "create_file", json!({"file": "a.html", "title": "T"}));
    let msg = call_ok(
        &router,
        "add_element",
        json!({"file": "a.html", "element": "button", "content": "Go", "attributes": {"id": "b1"}}),
    );
    assert!(msg.contains("button"));
    assert!(msg.contains("body"));

    let markup = call_ok(&router, "view", json!({"file": "a.html", "selector": "#b1"}));
    assert_eq!(markup, "<button id=\"b1\">Go</button>");
}

#[test]
fn test_create_existing_is_rejected_without_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("a.html");
    std::fs::write(&path, "<p>original</p>").expect("seed");

    let router = router(dir.path());
    let err = call_err(&router, "create_file", json!({"file": "a.html"}));

    assert!(matches!(editor_error(&err), EditorError::AlreadyExists { .. }));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), "<p>original</p>");
}

#[test]
fn test_edit_content_states() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());
    call_ok(&router, "create_file", json!({"file": "a.html", "content": "<p id=\"p\">Hello</p>"}));

    call_ok(&router, "edit_element", json!({"file": "a.html", "selector": "#p", "attributes": {"class": "x"}}));
    let kept = call_ok(&router, "view", json!({"file": "a.html", "selector": "#p"}));
    assert_eq!(kept, "<p id=\"p\" class=\"x\">Hello</p>");

    call_ok(&router, "edit_element", json!({"file": "a.html", "selector": "#p", "content": ""}));
    let cleared = call_ok(&router, "view", json!({"file": "a.html", "selector": "#p"}));
    assert_eq!(cleared, "<p id=\"p\" class=\"x\"></p>");
}

#[test]
fn test_edit_merges_styles_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());
    call_ok(
        &router,
        "create_file",
        json!({"file": "a.html", "content": "<div id=\"d\" style=\"color: red; font-size: 12px;\"></div>"}),
    );

    let msg = call_ok(
        &router,
        "edit_element",
        json!({"file": "a.html", "selector": "#d", "styles": {"backgroundColor": "blue"}}),
    );
    assert!(msg.contains("#d"));

    let markup = call_ok(&router, "view", json!({"file": "a.html", "selector": "#d"}));
    assert_eq!(
        markup,
        "<div id=\"d\" style=\"color: red; font-size: 12px; background-color: blue; \"></div>"
    );
}

#[test]
fn test_delete_then_view_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());
    call_ok(&router, "create_file", json!({"file": "a.html", "content": "<nav id=\"n\">x</nav>"}));

    call_ok(&router, "delete_element", json!({"file": "a.html", "selector": "#n"}));
    let err = call_err(&router, "view", json!({"file": "a.html", "selector": "#n"}));
    assert!(matches!(editor_error(&err), EditorError::TargetNotFound { .. }));
}

#[test]
fn test_legacy_tool_names() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    call_ok(&router, "html_create_file", json!({"file": "a.html", "title": "Legacy"}));
    let html = call_ok(&router, "html_view", json!({"file": "a.html", "selector": "title"}));
    assert_eq!(html, "<title>Legacy</title>");
}

#[test]
fn test_error_kinds() {
    let dir = tempfile::tempdir().expect("tempdir");
    let router = router(dir.path());

    let err = call_err(&router, "view", json!({"file": "nope.html"}));
    assert!(matches!(editor_error(&err), EditorError::NotFound { .. }));

    let err = call_err(&router, "add_element", json!({"file": "a.html"}));
    assert!(matches!(editor_error(&err), EditorError::InvalidArguments { .. }));

    let err = call_err(&router, "delete_element", Value::Null);
    assert!(matches!(editor_error(&err), EditorError::InvalidArguments { .. }));

    call_ok(&router, "create_file", json!({"file": "a.html"}));
    let err = call_err(&router, "view", json!({"file": "a.html", "selector": "p[[" }));
    assert!(matches!(editor_error(&err), EditorError::InvalidSelector { .. }));

    let result = router.call_tool("rename_file", json!({})).expect("unknown is not an Err");
    assert!(result.is_error);
}

#[test]
fn test_workspace_confinement() {
    let dir = tempfile::tempdir().expect("tempdir");
    let site = dir.path().join("site");
    std::fs::create_dir_all(&site).expect("mkdir");
    let router = ToolRouter::new(site, true);

    let err = call_err(&router, "create_file", json!({"file": "../escape.html"}));
    assert!(matches!(editor_error(&err), EditorError::OutsideWorkspace { .. }));
    assert!(!dir.path().join("escape.html").exists());
}
