//! MCP (Model Context Protocol) client side
//!
//! Tool discovery and invocation against a remote JSON-RPC endpoint.

pub mod catalog;
pub mod protocol;
pub mod server;

pub use catalog::{normalize_tools, normalize_tools_value};
pub use protocol::{MCPTool, ToolsListResult};
pub use server::MCPConnection;
