//! MCP JSON-RPC protocol
//!
//! Request builders and response envelope handling shared by connections.

pub mod types;

pub use types::{MCPError, MCPRequest, MCPResponse, MCPTool, ToolsListResult, JSONRPC_VERSION};

use crate::util::errors::{AgentError, AgentResult};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

pub fn create_request(id: u64, method: &str, params: Value) -> MCPRequest {
    MCPRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id,
        method: method.to_string(),
        params,
    }
}

pub fn create_tools_list_request(id: u64, cursor: Option<String>) -> MCPRequest {
    let params = match cursor {
        Some(cursor) => json!({ "cursor": cursor }),
        None => json!({}),
    };
    create_request(id, METHOD_TOOLS_LIST, params)
}

pub fn create_tools_call_request(id: u64, name: &str, arguments: Value) -> MCPRequest {
    create_request(
        id,
        METHOD_TOOLS_CALL,
        json!({ "name": name, "arguments": arguments }),
    )
}

/// Takes the `result` out of a response envelope, or the error it carries.
pub fn take_response_result(expected_id: u64, response: MCPResponse) -> AgentResult<Value> {
    if let Some(id) = response.id.as_u64() {
        if id != expected_id {
            return Err(AgentError::Protocol(format!(
                "Response id {} does not match request id {}",
                id, expected_id
            )));
        }
    }

    if let Some(error) = response.error {
        return Err(AgentError::Rpc {
            code: error.code,
            message: error.message,
        });
    }

    response.result.ok_or_else(|| {
        AgentError::Protocol("Response carries neither result nor error".to_string())
    })
}

pub fn parse_response_result<T: DeserializeOwned>(
    expected_id: u64,
    response: MCPResponse,
) -> AgentResult<T> {
    let result = take_response_result(expected_id, response)?;
    serde_json::from_value(result)
        .map_err(|e| AgentError::Protocol(format!("Unexpected result shape: {}", e)))
}

/// Extracts the JSON-RPC message from an SSE body (first `data:` frame that parses).
pub fn parse_sse_body(body: &str) -> AgentResult<MCPResponse> {
    for line in body.lines() {
        let Some(data) = line.strip_prefix("data:") else {
            continue;
        };
        if let Ok(response) = serde_json::from_str::<MCPResponse>(data.trim()) {
            return Ok(response);
        }
    }
    Err(AgentError::Protocol(
        "SSE response did not contain a JSON-RPC message".to_string(),
    ))
}
