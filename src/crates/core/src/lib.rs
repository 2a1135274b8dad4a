// Amadeus Agent Core Library
// Layering: Util -> Crypto -> Infrastructure -> Service -> Agentic

pub mod agentic; // Orchestrator, tool dispatch, two-phase transfers
pub mod crypto; // BLS12-381 transaction signing
pub mod infrastructure; // Model client seam
pub mod service; // Config, MCP connection and tool catalog
pub mod util; // Errors, text helpers

pub use util::errors::*;

pub use service::{
    config::AgentConfig,
    mcp::{normalize_tools, MCPConnection},
};

pub use infrastructure::ai::{ModelClient, ModelRequest};

pub use agentic::{
    core::{Conversation, OrchestratorState},
    execution::{ConversationOrchestrator, TurnOutcome},
    tools::{AllowAll, ToolCallGuard, ToolCallOutcome, ToolDispatcher, ToolTransport},
    transaction::{
        LocalBlsSigner, Network, PendingTransaction, Signature, SubmittedTransaction,
        TransactionCoordinator, TransactionSigner, UnsignedTransaction,
    },
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const CORE_NAME: &str = "Amadeus Agent Core";
