//! MCP connection over plain HTTP JSON-RPC
//!
//! One POST per request. Request ids come from a per-connection counter, so
//! concurrent calls never share an id.

use crate::service::mcp::protocol::{
    create_tools_call_request, create_tools_list_request, parse_response_result, parse_sse_body,
    take_response_result, MCPRequest, MCPResponse, MCPTool, ToolsListResult,
};
use crate::util::errors::{AgentError, AgentResult};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use serde_json::Value;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

const EVENT_STREAM_MIME_TYPE: &str = "text/event-stream";
const JSON_MIME_TYPE: &str = "application/json";

/// Upper bound on `tools/list` pages followed through `nextCursor`.
const MAX_TOOL_LIST_PAGES: usize = 64;

pub struct MCPConnection {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl MCPConnection {
    fn build_default_headers(headers: &HashMap<String, String>) -> HeaderMap {
        let mut header_map = HeaderMap::new();

        for (name, value) in headers {
            let Ok(header_name) = HeaderName::from_str(name) else {
                warn!("Invalid HTTP header name in MCP config (skipping): {}", name);
                continue;
            };
            let Ok(header_value) = HeaderValue::from_str(value.trim()) else {
                warn!(
                    "Invalid HTTP header value in MCP config (skipping): header={}",
                    name
                );
                continue;
            };
            header_map.insert(header_name, header_value);
        }

        if !header_map.contains_key(USER_AGENT) {
            header_map.insert(USER_AGENT, HeaderValue::from_static("Amadeus-MCP-Client/1.0"));
        }
        header_map.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/event-stream"),
        );

        header_map
    }

    /// Creates a connection to a remote JSON-RPC endpoint.
    ///
    /// No overall request timeout is set on the client; callers bound each call
    /// themselves (see the tool dispatcher).
    pub fn new(
        url: impl Into<String>,
        headers: HashMap<String, String>,
        connect_timeout: Duration,
    ) -> AgentResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .default_headers(Self::build_default_headers(&headers))
            .build()
            .map_err(|e| AgentError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn next_request_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn post(&self, request: &MCPRequest) -> AgentResult<MCPResponse> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AgentError::Transport(format!("{} request failed: {}", request.method, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Transport(format!(
                "{} returned HTTP status {}",
                request.method, status
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .map(|s| s.to_string());

        let body = response.text().await.map_err(|e| {
            AgentError::Transport(format!("Failed to read {} response: {}", request.method, e))
        })?;

        if let Some(ct) = content_type.as_deref() {
            if ct.starts_with(EVENT_STREAM_MIME_TYPE) {
                return parse_sse_body(&body);
            }
            if !ct.starts_with(JSON_MIME_TYPE) {
                debug!("Unexpected content type from MCP server, trying JSON: {}", ct);
            }
        }

        serde_json::from_str(&body).map_err(|e| {
            AgentError::Protocol(format!("Malformed {} response: {}", request.method, e))
        })
    }

    /// Sends one request and returns the raw `result` value.
    pub async fn send_request(&self, request: MCPRequest) -> AgentResult<Value> {
        let id = request.id;
        let response = self.post(&request).await?;
        take_response_result(id, response)
    }

    /// Lists one page of tools.
    pub async fn list_tools(&self, cursor: Option<String>) -> AgentResult<ToolsListResult> {
        let request = create_tools_list_request(self.next_request_id(), cursor);
        let id = request.id;
        let response = self.post(&request).await?;
        parse_response_result(id, response)
    }

    /// Lists every tool, following `nextCursor` pages.
    pub async fn list_all_tools(&self) -> AgentResult<Vec<MCPTool>> {
        let mut tools = Vec::new();
        let mut cursor = None;

        for _ in 0..MAX_TOOL_LIST_PAGES {
            let page = self.list_tools(cursor.take()).await?;
            tools.extend(page.tools);
            match page.next_cursor {
                Some(next) if !next.is_empty() => cursor = Some(next),
                _ => {
                    debug!("Fetched MCP tool catalog: url={}, tools={}", self.url, tools.len());
                    return Ok(tools);
                }
            }
        }

        Err(AgentError::Protocol(format!(
            "tools/list did not terminate after {} pages",
            MAX_TOOL_LIST_PAGES
        )))
    }

    /// Calls a tool and returns its result unchanged.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            Value::Object(map) => Value::Object(map),
            other => {
                return Err(AgentError::Validation(format!(
                    "MCP tool arguments must be an object, got: {}",
                    other
                )));
            }
        };

        let request = create_tools_call_request(self.next_request_id(), name, arguments);
        self.send_request(request).await
    }
}
