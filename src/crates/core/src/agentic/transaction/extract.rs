//! Unsigned transaction extraction from tool results.

use super::policy::CREATE_TRANSACTION;
use crate::agentic::core::Conversation;
use crate::util::errors::{AgentError, AgentResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Nesting depth searched inside a tool payload, JSON-encoded strings included.
const MAX_SEARCH_DEPTH: usize = 16;

/// Artifacts returned by `create_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    /// Hex-encoded bytes to sign.
    pub signing_payload: String,
    /// Opaque transaction body broadcast once signed.
    pub blob: String,
}

/// Finds the first object holding non-empty `signing_payload` and `blob` strings.
///
/// String values that look like JSON are decoded and searched too, which
/// covers results wrapped in MCP `content[].text`.
pub fn find_unsigned_transaction(value: &Value) -> Option<UnsignedTransaction> {
    search(value, 0)
}

fn search(value: &Value, depth: usize) -> Option<UnsignedTransaction> {
    if depth > MAX_SEARCH_DEPTH {
        return None;
    }

    match value {
        Value::Object(map) => {
            if let (Some(Value::String(signing_payload)), Some(Value::String(blob))) =
                (map.get("signing_payload"), map.get("blob"))
            {
                if !signing_payload.is_empty() && !blob.is_empty() {
                    return Some(UnsignedTransaction {
                        signing_payload: signing_payload.clone(),
                        blob: blob.clone(),
                    });
                }
            }
            map.values().find_map(|v| search(v, depth + 1))
        }
        Value::Array(items) => items.iter().find_map(|v| search(v, depth + 1)),
        Value::String(text) => {
            let trimmed = text.trim_start();
            if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
                return None;
            }
            serde_json::from_str::<Value>(trimmed)
                .ok()
                .and_then(|decoded| search(&decoded, depth + 1))
        }
        _ => None,
    }
}

/// Scans successful `create_transaction` results in history order; the first
/// match wins. Payloads returned by any other tool are never treated as
/// something to sign.
pub fn extract_unsigned_transaction(conversation: &Conversation) -> AgentResult<UnsignedTransaction> {
    conversation
        .tool_results()
        .filter(|(_, _, is_error)| !is_error)
        .filter(|(tool_use_id, _, _)| {
            conversation
                .tool_use_by_id(tool_use_id)
                .is_some_and(|tool_use| tool_use.name == CREATE_TRANSACTION)
        })
        .find_map(|(_, content, _)| {
            serde_json::from_str::<Value>(content)
                .ok()
                .and_then(|payload| find_unsigned_transaction(&payload))
        })
        .ok_or(AgentError::TransactionNotFound)
}
