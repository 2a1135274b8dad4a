//! Shared AI protocol adapters for the Amadeus agent.
//!
//! `types` holds the Anthropic Messages API wire shapes that the agent keeps as
//! its conversation history; `client` sends them over HTTP.

pub mod client;
pub mod types;

pub use client::anthropic::{AnthropicClient, AnthropicClientConfig};
pub use types::anthropic::{
    AnthropicError, AnthropicErrorEnvelope, ContentBlock, Message, MessageContent,
    MessagesRequest, MessagesResponse, Role, StopReason, ToolDescriptor, Usage,
};
