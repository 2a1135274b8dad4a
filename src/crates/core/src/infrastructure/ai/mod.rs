//! Model interface
//!
//! The orchestrator talks to the language model only through `ModelClient`.

use crate::util::errors::{AgentError, AgentResult};
use amadeus_ai_adapters::{AnthropicClient, Message, MessagesResponse, ToolDescriptor};
use async_trait::async_trait;

/// One model call: full history, full catalog, optional policy text.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub system: Option<&'a str>,
    pub tools: &'a [ToolDescriptor],
    pub messages: &'a [Message],
    pub max_tokens: u32,
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Transport or API failures come back as `AgentError::Model`.
    async fn create_message(&self, request: ModelRequest<'_>) -> AgentResult<MessagesResponse>;
}

#[async_trait]
impl ModelClient for AnthropicClient {
    async fn create_message(&self, request: ModelRequest<'_>) -> AgentResult<MessagesResponse> {
        AnthropicClient::create_message(
            self,
            request.system,
            request.tools,
            request.messages,
            request.max_tokens,
        )
        .await
        .map_err(|e| AgentError::Model(format!("{:#}", e)))
    }
}
