//! Execution engine module

pub mod engine;

pub use engine::{ConversationOrchestrator, TurnOutcome, DEFAULT_MAX_TOKENS};
