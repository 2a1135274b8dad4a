//! Agentic layer
//!
//! Conversation model, tool dispatch, the orchestrator loop and the two-phase
//! transfer coordinator built on top of it.

pub mod core;
pub mod execution;
pub mod tools;
pub mod transaction;

pub use self::core::{Conversation, OrchestratorState, ToolUse};
pub use execution::{ConversationOrchestrator, TurnOutcome};
pub use tools::{ToolCallGuard, ToolCallOutcome, ToolDispatcher, ToolTransport};
pub use transaction::{PendingTransaction, SubmittedTransaction, TransactionCoordinator};
