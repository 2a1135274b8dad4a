//! MCP server connections

pub mod connection;

pub use connection::MCPConnection;
