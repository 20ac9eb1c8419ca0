//! MCP-backed tool host.

use super::{McpClient, McpError, ToolError, ToolHost};
use crate::model::{ToolCall, ToolSpec};
use rmcp::model::CallToolResult;
use serde_json::{Map, Value};

/// Tool host backed by an MCP server.
pub struct McpToolHost {
    client: McpClient,
    specs: Vec<ToolSpec>,
}

impl McpToolHost {
    /// Wrap a connected client and cache its tool specs.
    pub async fn new(client: McpClient) -> Result<Self, McpError> {
        let specs = client
            .list_tools()
            .await?
            .into_iter()
            .map(ToolSpec::from)
            .collect();
        Ok(Self { client, specs })
    }

    /// Connect to a streamable HTTP endpoint.
    pub async fn connect(url: impl Into<String>) -> Result<Self, McpError> {
        Self::new(McpClient::connect(url).await?).await
    }

    /// Spawn an MCP server over stdio.
    pub async fn spawn(
        command: impl AsRef<str>,
        args: impl IntoIterator<Item = impl AsRef<str>>,
    ) -> Result<Self, McpError> {
        Self::new(McpClient::spawn(command, args).await?).await
    }

    /// Close the underlying session.
    pub async fn shutdown(self) -> Result<(), McpError> {
        self.client.shutdown().await
    }
}

impl ToolHost for McpToolHost {
    fn specs(&self) -> &[ToolSpec] {
        &self.specs
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let arguments = arguments(&call.input)?;
        let result = self
            .client
            .call_tool(&call.name, arguments)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        output(result)
    }
}

/// Tool input as MCP call arguments. `null` means "no arguments".
fn arguments(input: &Value) -> Result<Option<Map<String, Value>>, ToolError> {
    match input {
        Value::Null => Ok(None),
        Value::Object(map) => Ok(Some(map.clone())),
        other => Err(ToolError::InvalidInput(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

/// Flatten a call result into the JSON handed back to the model.
///
/// Structured content wins; otherwise text blocks are joined and parsed as
/// JSON when possible.
fn output(result: CallToolResult) -> Result<Value, ToolError> {
    let text = result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.as_str()))
        .collect::<Vec<_>>()
        .join("\n");

    if result.is_error == Some(true) {
        return Err(ToolError::Execution(text));
    }

    if let Some(structured) = result.structured_content {
        return Ok(structured);
    }

    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}
