#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use amadeus_agent_core::agentic::transaction::{
    LocalBlsSigner, Signature, TransactionSigner, UnsignedTransaction,
};
use amadeus_agent_core::{AgentError, AgentResult, ModelClient, ModelRequest, ToolTransport};
use amadeus_ai_adapters::{Message, MessagesResponse};
use async_trait::async_trait;
use serde_json::{json, Value};

/// What the model saw on one call.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: Option<String>,
    pub messages: Vec<Message>,
    pub tool_count: usize,
}

/// Model double that answers from the visible history.
pub struct ScriptedModel<F> {
    script: F,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl<F> ScriptedModel<F>
where
    F: Fn(&[Message]) -> MessagesResponse + Send + Sync,
{
    pub fn new(script: F) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl<F> ModelClient for ScriptedModel<F>
where
    F: Fn(&[Message]) -> MessagesResponse + Send + Sync,
{
    async fn create_message(&self, request: ModelRequest<'_>) -> AgentResult<MessagesResponse> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.map(str::to_string),
            messages: request.messages.to_vec(),
            tool_count: request.tools.len(),
        });
        Ok((self.script)(request.messages))
    }
}

pub fn text_response(text: &str) -> MessagesResponse {
    serde_json::from_value(json!({
        "id": "msg_text",
        "stop_reason": "end_turn",
        "content": [{"type": "text", "text": text}]
    }))
    .unwrap()
}

pub fn tool_use_response(calls: &[(&str, &str, Value)]) -> MessagesResponse {
    let content: Vec<Value> = calls
        .iter()
        .map(|(id, name, input)| json!({"type": "tool_use", "id": id, "name": name, "input": input}))
        .collect();
    serde_json::from_value(json!({
        "id": "msg_tools",
        "stop_reason": "tool_use",
        "content": content
    }))
    .unwrap()
}

/// Transport double: canned results per tool name, every call recorded.
#[derive(Default)]
pub struct RecordingTransport {
    results: HashMap<String, Value>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl RecordingTransport {
    pub fn with_result(mut self, name: &str, result: Value) -> Self {
        self.results.insert(name.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_named(&self, name: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(n, _)| n == name)
            .map(|(_, args)| args)
            .collect()
    }
}

#[async_trait]
impl ToolTransport for RecordingTransport {
    async fn call_tool(&self, name: &str, arguments: Value) -> AgentResult<Value> {
        self.calls
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        self.results.get(name).cloned().ok_or_else(|| AgentError::Rpc {
            code: -32601,
            message: format!("Unknown tool: {}", name),
        })
    }
}

/// Local signer that counts how often it was asked to sign.
pub struct CountingSigner {
    inner: LocalBlsSigner,
    pub count: AtomicUsize,
}

impl CountingSigner {
    pub fn new(secret_key_b58: &str) -> Self {
        Self {
            inner: LocalBlsSigner::new(secret_key_b58),
            count: AtomicUsize::new(0),
        }
    }

    pub fn sign_count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransactionSigner for CountingSigner {
    async fn sign(&self, unsigned: &UnsignedTransaction) -> AgentResult<Signature> {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.inner.sign(unsigned).await
    }
}

pub fn test_secret() -> String {
    bs58::encode([42u8; 64]).into_string()
}
