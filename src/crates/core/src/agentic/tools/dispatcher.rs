//! Tool invocation dispatcher
//!
//! Runs model-requested tool calls against the remote endpoint. Every call ends
//! in a `ToolCallOutcome`; transport faults, RPC errors and timeouts are data.

use super::guard::ToolCallGuard;
use crate::agentic::core::ToolUse;
use crate::service::mcp::MCPConnection;
use crate::util::errors::{AgentError, AgentResult};
use crate::util::text::truncate;
use amadeus_ai_adapters::ContentBlock;
use async_trait::async_trait;
use futures::future::join_all;
use log::{info, warn};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use crate::util::errors::TIMED_OUT;

const LOG_PREVIEW_BYTES: usize = 500;

/// Remote side of a tool call.
#[async_trait]
pub trait ToolTransport: Send + Sync {
    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Value>;
}

#[async_trait]
impl ToolTransport for MCPConnection {
    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        MCPConnection::call_tool(self, name, arguments).await
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolCallOutcome {
    pub success: bool,
    pub payload: Value,
    pub error: Option<String>,
}

impl ToolCallOutcome {
    pub fn succeeded(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(error.into()),
        }
    }

    /// Tool result block for the model; failures are `{"error": ...}` with `is_error`.
    pub fn into_tool_result(self, tool_use_id: impl Into<String>) -> ContentBlock {
        let tool_use_id = tool_use_id.into();
        if self.success {
            ContentBlock::ToolResult {
                tool_use_id,
                content: self.payload.to_string(),
                is_error: false,
            }
        } else {
            ContentBlock::ToolResult {
                tool_use_id,
                content: json!({ "error": self.error.unwrap_or_default() }).to_string(),
                is_error: true,
            }
        }
    }
}

/// One finished call of a batch.
#[derive(Debug, Clone)]
pub struct DispatchedCall {
    pub tool_use: ToolUse,
    pub outcome: ToolCallOutcome,
    pub elapsed: Duration,
}

impl DispatchedCall {
    pub fn to_tool_result(&self) -> ContentBlock {
        self.outcome.clone().into_tool_result(self.tool_use.id.clone())
    }
}

pub struct ToolDispatcher {
    transport: Arc<dyn ToolTransport>,
    call_timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(transport: Arc<dyn ToolTransport>, call_timeout: Duration) -> Self {
        Self {
            transport,
            call_timeout,
        }
    }

    pub fn call_timeout(&self) -> Duration {
        self.call_timeout
    }

    /// Runs one tool call, bounded by `timeout`.
    ///
    /// On timeout the request future is dropped, which also drops the
    /// in-flight HTTP request; a late response is never read.
    pub async fn invoke(&self, name: &str, arguments: Value, timeout: Duration) -> ToolCallOutcome {
        let arguments_preview = truncate(&arguments.to_string(), LOG_PREVIEW_BYTES);
        let started = Instant::now();

        let outcome = match tokio::time::timeout(timeout, self.transport.call_tool(name, arguments)).await {
            Ok(Ok(payload)) => ToolCallOutcome::succeeded(payload),
            Ok(Err(e)) => ToolCallOutcome::failed(e.tool_message()),
            Err(_) => {
                let err = AgentError::Timeout(format!("{} after {}ms", name, timeout.as_millis()));
                ToolCallOutcome::failed(err.tool_message())
            }
        };

        let elapsed_ms = started.elapsed().as_millis();
        if outcome.success {
            info!(
                "Tool call finished: name={}, arguments={}, elapsed_ms={}, result={}",
                name,
                arguments_preview,
                elapsed_ms,
                truncate(&outcome.payload.to_string(), LOG_PREVIEW_BYTES)
            );
        } else {
            warn!(
                "Tool call failed: name={}, arguments={}, elapsed_ms={}, error={}",
                name,
                arguments_preview,
                elapsed_ms,
                outcome.error.as_deref().unwrap_or("")
            );
        }

        outcome
    }

    /// Runs every call of one model turn concurrently and waits for all of them.
    ///
    /// Results keep the order of `tool_uses`.
    pub async fn dispatch_batch(
        &self,
        tool_uses: &[ToolUse],
        guard: &dyn ToolCallGuard,
    ) -> Vec<DispatchedCall> {
        let calls = tool_uses.iter().map(|tool_use| async move {
            let started = Instant::now();
            let outcome = match guard.check(&tool_use.name, &tool_use.input) {
                Ok(()) => {
                    self.invoke(&tool_use.name, tool_use.input.clone(), self.call_timeout)
                        .await
                }
                Err(reason) => {
                    warn!(
                        "Tool call rejected before dispatch: name={}, id={}, reason={}",
                        tool_use.name, tool_use.id, reason
                    );
                    ToolCallOutcome::failed(format!("rejected: {}", reason))
                }
            };
            DispatchedCall {
                tool_use: tool_use.clone(),
                outcome,
                elapsed: started.elapsed(),
            }
        });

        join_all(calls).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agentic::tools::guard::AllowAll;

    struct EchoTransport;

    #[async_trait]
    impl ToolTransport for EchoTransport {
        async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Value> {
            match name {
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(Value::Null)
                }
                "broken" => Err(AgentError::Rpc {
                    code: -32000,
                    message: "node unavailable".to_string(),
                }),
                "offline" => Err(AgentError::Transport("connection refused".to_string())),
                _ => Ok(json!({ "echo": arguments })),
            }
        }
    }

    struct DenySubmit;

    impl ToolCallGuard for DenySubmit {
        fn check(&self, name: &str, _input: &Value) -> Result<(), String> {
            if name == "submit_transaction" {
                Err("no signature".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn dispatcher() -> ToolDispatcher {
        ToolDispatcher::new(Arc::new(EchoTransport), Duration::from_millis(100))
    }

    fn tool_use(id: &str, name: &str) -> ToolUse {
        ToolUse {
            id: id.to_string(),
            name: name.to_string(),
            input: json!({ "id": id }),
        }
    }

    #[tokio::test]
    async fn success_payload_is_passed_through() {
        let outcome = dispatcher()
            .invoke("get_nodes", json!({"a": 1}), Duration::from_secs(1))
            .await;
        assert_eq!(outcome, ToolCallOutcome::succeeded(json!({"echo": {"a": 1}})));
    }

    #[tokio::test]
    async fn rpc_error_message_is_reported() {
        let outcome = dispatcher()
            .invoke("broken", json!({}), Duration::from_secs(1))
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("node unavailable"));
    }

    #[tokio::test]
    async fn timeout_yields_timed_out_outcome() {
        let outcome = dispatcher()
            .invoke("slow", json!({}), Duration::from_millis(50))
            .await;
        assert_eq!(outcome, ToolCallOutcome::failed(TIMED_OUT));
    }

    #[tokio::test]
    async fn batch_returns_one_result_per_use_in_order() {
        let uses = vec![
            tool_use("a", "get_nodes"),
            tool_use("b", "broken"),
            tool_use("c", "offline"),
            tool_use("d", "submit_transaction"),
        ];
        let calls = dispatcher().dispatch_batch(&uses, &DenySubmit).await;

        let ids: Vec<_> = calls.iter().map(|c| c.tool_use.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
        assert!(calls[0].outcome.success);
        assert!(!calls[1].outcome.success);
        assert!(calls[2]
            .outcome
            .error
            .as_deref()
            .is_some_and(|e| e.contains("connection refused")));
        assert_eq!(
            calls[3].outcome.error.as_deref(),
            Some("rejected: no signature")
        );
    }

    #[tokio::test]
    async fn failed_outcome_becomes_error_tool_result() {
        let calls = dispatcher()
            .dispatch_batch(&[tool_use("x", "broken")], &AllowAll)
            .await;
        match calls[0].to_tool_result() {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => {
                assert_eq!(tool_use_id, "x");
                assert!(is_error);
                let body: Value = serde_json::from_str(&content).unwrap();
                assert_eq!(body, json!({"error": "node unavailable"}));
            }
            other => panic!("unexpected block: {:?}", other),
        }
    }
}
