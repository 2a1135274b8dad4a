//! Conversation history
//!
//! Append-only: messages can be pushed and read, never edited or removed.

use amadeus_ai_adapters::{ContentBlock, Message, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    system: Option<String>,
    messages: Vec<Message>,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUse {
    pub id: String,
    pub name: String,
    pub input: serde_json::Value,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a conversation with a single user message.
    pub fn from_user_text(text: impl Into<String>) -> Self {
        let mut conversation = Self::new();
        conversation.push(Message::user_text(text));
        conversation
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn push_user_text(&mut self, text: impl Into<String>) {
        self.push(Message::user_text(text));
    }

    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    /// ToolUse blocks of the latest message, if it is an assistant message.
    pub fn pending_tool_uses(&self) -> Vec<ToolUse> {
        let Some(last) = self.last().filter(|m| m.role == Role::Assistant) else {
            return Vec::new();
        };
        last.blocks()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => Some(ToolUse {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
            .collect()
    }

    /// Every ToolResult block in history order.
    pub fn tool_results(&self) -> impl Iterator<Item = (&str, &str, bool)> + '_ {
        self.messages.iter().flat_map(|m| m.blocks()).filter_map(|block| match block {
            ContentBlock::ToolResult {
                tool_use_id,
                content,
                is_error,
            } => Some((tool_use_id.as_str(), content.as_str(), *is_error)),
            _ => None,
        })
    }

    /// Finds the ToolUse that a result id answers.
    pub fn tool_use_by_id(&self, tool_use_id: &str) -> Option<ToolUse> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant)
            .flat_map(|m| m.blocks())
            .find_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } if id == tool_use_id => Some(ToolUse {
                    id: id.clone(),
                    name: name.clone(),
                    input: input.clone(),
                }),
                _ => None,
            })
    }
}
