//! Unified error handling
//!
//! Per-tool-call failures are folded into tool results by the dispatcher; every
//! other variant reaches the caller unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    /// RPC endpoint unreachable or answered with a non-2xx status.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    /// Malformed JSON-RPC envelope (no result and no error, id mismatch, bad body).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Well-formed JSON-RPC error envelope.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No unsigned transaction (signing_payload + blob) found in tool results")]
    TransactionNotFound,

    /// Model-interface transport failure; fatal to the running conversation.
    #[error("Model error: {0}")]
    Model(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AgentResult<T> = Result<T, AgentError>;

/// Tool error message for a call that exceeded its timeout.
pub const TIMED_OUT: &str = "timed out";

impl AgentError {
    /// Message surfaced to the model when a tool call fails.
    pub fn tool_message(&self) -> String {
        match self {
            AgentError::Timeout(_) => TIMED_OUT.to_string(),
            AgentError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

impl From<toml::de::Error> for AgentError {
    fn from(error: toml::de::Error) -> Self {
        AgentError::Config(error.to_string())
    }
}
