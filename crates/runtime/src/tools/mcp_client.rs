//! MCP (Model Context Protocol) client.
//!
//! Connects to a tool server either over streamable HTTP or by spawning it as
//! a child process and speaking stdio.
//!
//! # Example
//!
//! ```ignore
//! use runtime::McpClient;
//!
//! # async fn example() -> Result<(), runtime::McpError> {
//! let client = McpClient::connect("http://localhost:8080/mcp").await?;
//!
//! let tools = client.list_tools().await?;
//! for tool in &tools {
//!     println!("Tool: {}", tool.name);
//! }
//! # Ok(())
//! # }
//! ```

use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, Tool},
    service::{RoleClient, RunningService},
    transport::{
        ConfigureCommandExt, IntoTransport, StreamableHttpClientTransport, TokioChildProcess,
    },
};
use tokio::process::Command;
use tracing::debug;

/// Error type for MCP operations.
pub type McpError = Box<dyn std::error::Error + Send + Sync>;

/// An MCP client connected to a tool server.
pub struct McpClient {
    service: RunningService<RoleClient, ()>,
}

impl McpClient {
    /// Connect to a streamable HTTP endpoint such as `http://host:8080/mcp`.
    pub async fn connect(url: impl Into<String>) -> Result<Self, McpError> {
        let url = url.into();
        debug!(%url, "connecting to MCP server");
        let transport = StreamableHttpClientTransport::from_uri(url);
        Self::from_transport(transport).await
    }

    /// Spawn an MCP server and connect to it over stdio.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to run (e.g., "mwb-mcp")
    /// * `args` - Arguments to pass to the command
    pub async fn spawn(
        command: impl AsRef<str>,
        args: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, McpError> {
        let command_str = command.as_ref().to_string();
        let args_vec: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        debug!(command = %command_str, args = ?args_vec, "spawning MCP server");

        let transport = TokioChildProcess::new(Command::new(&command_str).configure(|cmd| {
            for arg in &args_vec {
                cmd.arg(arg);
            }
        }))?;

        Self::from_transport(transport).await
    }

    /// Run the client handshake over an arbitrary transport.
    pub async fn from_transport<T, E, A>(transport: T) -> Result<Self, McpError>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let service = ().serve(transport).await?;
        Ok(Self { service })
    }

    /// List available tools from the server.
    pub async fn list_tools(&self) -> Result<Vec<Tool>, McpError> {
        let response = self.service.list_tools(Default::default()).await?;
        Ok(response.tools)
    }

    /// Call a tool with the given name and arguments.
    pub async fn call_tool(
        &self,
        name: impl Into<String>,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<CallToolResult, McpError> {
        let params = CallToolRequestParams {
            name: name.into().into(),
            arguments,
            meta: None,
            task: None,
        };

        let result = self.service.call_tool(params).await?;
        Ok(result)
    }

    /// Close the session. Child-process servers are terminated.
    pub async fn shutdown(self) -> Result<(), McpError> {
        self.service.cancel().await?;
        Ok(())
    }
}
