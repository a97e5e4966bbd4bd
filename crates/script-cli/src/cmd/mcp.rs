//! MCP server over stdio: one JSON-RPC 2.0 message per line in, one
//! response per line out.

use crate::tools::{self, ScriptTool};
use anyhow::Context;
use script_core::workspace::Workspace;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::path::Path;

const JSONRPC_VERSION: &str = "2.0";
const PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i32 = -32700;
const INVALID_REQUEST: i32 = -32600;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    jsonrpc: String,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
pub struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(flatten)]
    outcome: Outcome,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Result(Value),
    Error(RpcError),
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Response {
    fn ok(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Result(result),
        }
    }

    fn err(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            outcome: Outcome::Error(error),
        }
    }
}

pub fn run(root: &Path) -> anyhow::Result<()> {
    let ws = Workspace::load(root).context("failed to load workspace")?;
    let tools = tools::all_tools();
    tracing::info!(root = %root.display(), "script-creator MCP server running on stdio");

    let stdout = std::io::stdout();
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        if let Some(response) = handle_line(&line, &tools, &ws) {
            write_response(&mut stdout.lock(), &response)?;
        }
    }
    Ok(())
}

fn write_response(out: &mut impl Write, response: &Response) -> anyhow::Result<()> {
    serde_json::to_writer(&mut *out, response)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

/// Answer one input line. Notifications (no `id`) get no reply.
pub fn handle_line(line: &str, tools: &[Box<dyn ScriptTool>], ws: &Workspace) -> Option<Response> {
    let raw: Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Some(Response::err(
                Value::Null,
                RpcError::new(PARSE_ERROR, format!("parse error: {e}")),
            ))
        }
    };
    let id = raw.get("id").cloned()?;

    let request: Request = match serde_json::from_value(raw) {
        Ok(r) => r,
        Err(e) => {
            return Some(Response::err(
                id,
                RpcError::new(INVALID_REQUEST, format!("invalid request: {e}")),
            ))
        }
    };
    if request.jsonrpc != JSONRPC_VERSION {
        return Some(Response::err(
            id,
            RpcError::new(
                INVALID_REQUEST,
                format!("unsupported jsonrpc version '{}'", request.jsonrpc),
            ),
        ));
    }

    let outcome = match request.method.as_str() {
        "initialize" => Ok(json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": "script-creator",
                "version": env!("CARGO_PKG_VERSION")
            }
        })),
        "tools/list" => Ok(json!({
            "tools": tools.iter().map(|t| describe(t.as_ref())).collect::<Vec<_>>()
        })),
        "tools/call" => call_tool(&request.params, tools, ws),
        other => Err(RpcError::new(
            METHOD_NOT_FOUND,
            format!("method not found: {other}"),
        )),
    };
    Some(match outcome {
        Ok(result) => Response::ok(id, result),
        Err(error) => Response::err(id, error),
    })
}

fn describe(tool: &dyn ScriptTool) -> Value {
    json!({
        "name": tool.name(),
        "description": tool.description(),
        "inputSchema": tool.schema()
    })
}

/// Run a tool. Rendering failures become an `isError` result carrying the
/// message, so the calling agent can read it and retry.
fn call_tool(
    params: &Value,
    tools: &[Box<dyn ScriptTool>],
    ws: &Workspace,
) -> Result<Value, RpcError> {
    if params.is_null() {
        return Err(RpcError::new(INVALID_PARAMS, "missing params"));
    }
    let name = params["name"]
        .as_str()
        .ok_or_else(|| RpcError::new(INVALID_PARAMS, "missing tool name in params"))?;
    let tool = tools
        .iter()
        .find(|t| t.name() == name)
        .ok_or_else(|| RpcError::new(METHOD_NOT_FOUND, format!("tool not found: {name}")))?;
    let args = params.get("arguments").cloned().unwrap_or(Value::Null);

    let (text, is_error) = match tool.call(args, ws) {
        Ok(Value::String(s)) => (s, false),
        Ok(v) => match serde_json::to_string_pretty(&v) {
            Ok(s) => (s, false),
            Err(e) => (format!("serialization error: {e}"), true),
        },
        Err(e) => {
            tracing::warn!(tool = name, error = %e, "tool call failed");
            (format!("Error rendering templates: {e}"), true)
        }
    };
    Ok(json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Send one line and return the serialized response.
    fn exchange(line: &str) -> Option<Value> {
        let dir = TempDir::new().unwrap();
        let ws = Workspace::load(dir.path()).unwrap();
        let tools = tools::all_tools();
        handle_line(line, &tools, &ws).map(|r| serde_json::to_value(r).unwrap())
    }

    fn call(id: i64, method: &str, params: Value) -> Value {
        let line = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params});
        exchange(&line.to_string()).unwrap()
    }

    #[test]
    fn initialize_reports_server_info() {
        let resp = call(1, "initialize", json!({"capabilities": {}}));
        assert_eq!(resp["jsonrpc"], "2.0");
        assert_eq!(resp["id"], 1);
        assert!(resp.get("error").is_none());
        assert_eq!(resp["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert!(resp["result"]["capabilities"]["tools"].is_object());
        assert_eq!(resp["result"]["serverInfo"]["name"], "script-creator");
    }

    #[test]
    fn tools_list_names_both_tools() {
        let resp = call(2, "tools/list", json!({}));
        let tools = resp["result"]["tools"].as_array().unwrap();
        let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["CreateLibEnsembleScripts", "ListGenerators"]);
        assert_eq!(
            tools[0]["inputSchema"]["properties"]["template_vars"]["type"],
            "array"
        );
    }

    #[test]
    fn create_scripts_returns_sectioned_text() {
        let resp = call(
            3,
            "tools/call",
            json!({
                "name": "CreateLibEnsembleScripts",
                "arguments": {"app_ref": "warpx", "gen_module": "persistent_aposmm", "gen_function": "aposmm"}
            }),
        );
        let result = &resp["result"];
        assert_eq!(result["isError"], false);
        assert_eq!(result["content"][0]["type"], "text");
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("=== run_libe.py ===\n#!/usr/bin/env python"));
        assert!(text.contains("persistent_aposmm_alloc"));
    }

    #[test]
    fn render_failure_is_a_tool_error() {
        let resp = call(
            4,
            "tools/call",
            json!({"name": "CreateLibEnsembleScripts", "arguments": {"procs": "-4"}}),
        );
        assert!(resp.get("error").is_none());
        assert_eq!(resp["result"]["isError"], true);
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.starts_with("Error rendering templates: "));
        assert!(text.contains("procs"));
    }

    #[test]
    fn list_generators_is_pretty_json() {
        let resp = call(5, "tools/call", json!({"name": "ListGenerators"}));
        let text = resp["result"]["content"][0]["text"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(text).unwrap();
        assert!(parsed["generators"].is_array());
    }

    #[test]
    fn unknown_tool_and_method_are_not_found() {
        let resp = call(6, "tools/call", json!({"name": "nope", "arguments": {}}));
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
        assert!(resp.get("result").is_none());

        let resp = call(7, "unknown/method", Value::Null);
        assert_eq!(resp["error"]["code"], METHOD_NOT_FOUND);
        assert!(resp["error"]["message"]
            .as_str()
            .unwrap()
            .contains("method not found"));
    }

    #[test]
    fn tools_call_without_params_or_name_is_invalid() {
        let resp = exchange(r#"{"jsonrpc":"2.0","id":8,"method":"tools/call"}"#).unwrap();
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);

        let resp = call(9, "tools/call", json!({"arguments": {}}));
        assert_eq!(resp["error"]["code"], INVALID_PARAMS);
    }

    #[test]
    fn malformed_lines_get_protocol_errors() {
        let resp = exchange("not json").unwrap();
        assert_eq!(resp["error"]["code"], PARSE_ERROR);
        assert_eq!(resp["id"], Value::Null);

        let resp = exchange(r#"{"jsonrpc":"2.0","id":10}"#).unwrap();
        assert_eq!(resp["error"]["code"], INVALID_REQUEST);
        assert_eq!(resp["id"], 10);

        let resp = exchange(r#"{"jsonrpc":"1.0","id":11,"method":"initialize"}"#).unwrap();
        assert_eq!(resp["error"]["code"], INVALID_REQUEST);
        assert!(resp["error"]["message"].as_str().unwrap().contains("1.0"));
    }

    #[test]
    fn notifications_get_no_reply() {
        assert!(exchange(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).is_none());
    }

    #[test]
    fn responses_are_newline_delimited() {
        let mut buf = Vec::new();
        write_response(&mut buf, &Response::ok(json!(1), json!({}))).unwrap();
        write_response(&mut buf, &Response::err(json!(2), RpcError::new(PARSE_ERROR, "x"))).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"jsonrpc":"2.0","id":1,"result":{}}"#);
        assert_eq!(
            lines[1],
            r#"{"jsonrpc":"2.0","id":2,"error":{"code":-32700,"message":"x"}}"#
        );
    }
}
