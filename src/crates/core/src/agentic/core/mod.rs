//! Core data model module
//!
//! Conversation history and orchestrator state.

pub mod conversation;
pub mod state;

pub use conversation::{Conversation, ToolUse};
pub use state::OrchestratorState;
