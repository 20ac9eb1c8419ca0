//! Tool-calling runtime for the Metabolomics Workbench MCP server.
//!
//! This crate drives a language model against the Workbench tools:
//! it sends the conversation to a provider, runs any tool calls the model
//! makes through an MCP client, and loops until the model answers in text.
//!
//! # Overview
//!
//! - **Backend**: A trait abstracting LLM providers (Anthropic, OpenAI, Gemini).
//! - **ToolHost**: A trait for whatever executes tool calls; `McpToolHost`
//!   talks to an MCP server.
//! - **Conversation**: The bounded call-model, run-tools, repeat loop.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{AnthropicBackend, Conversation, McpToolHost};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//! let backend = AnthropicBackend::builder("sk-ant-...", "claude-3-haiku-20240307").build();
//! let tools = McpToolHost::connect("http://localhost:8080/mcp").await?;
//!
//! let conversation = Conversation::new(backend, tools).with_max_turns(8);
//! let exchange = conversation
//!     .ask("Can you give me the summary of study ST000001?")
//!     .await?;
//! println!("{:?}", exchange.outcome);
//! # Ok(())
//! # }
//! ```

mod conversation;
mod error;
pub mod model;
pub mod providers;
pub mod tools;

pub use conversation::{Conversation, DEFAULT_MAX_TURNS, Exchange, Outcome};
pub use error::{ConversationError, Result};
pub use model::{
    Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, ToolCall, ToolResult,
    ToolSpec, Usage,
};
pub use providers::{
    AnthropicBackend, BackendSettings, GeminiBackend, OpenAiBackend, Provider, ProviderBackend,
};
pub use tools::{EmptyToolHost, McpClient, McpError, McpToolHost, ToolError, ToolHost};
