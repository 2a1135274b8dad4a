//! Service layer: configuration and the MCP tool endpoint.

pub mod config;
pub mod mcp;

pub use config::AgentConfig;
