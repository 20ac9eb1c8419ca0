//! Tool execution and MCP integration.

mod empty;
pub mod errors;
mod host;
mod mcp_client;
mod mcp_host;

pub use empty::EmptyToolHost;
pub use errors::ToolError;
pub use host::ToolHost;
pub use mcp_client::{McpClient, McpError};
pub use mcp_host::McpToolHost;
