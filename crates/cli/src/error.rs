//! CLI error types.

use thiserror::Error;

use crate::config::ConfigError;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// No API key in the config file or the provider's environment variable.
    #[error("no API key for {provider}: set backend.api_key or {env}")]
    MissingApiKey {
        provider: runtime::Provider,
        env: &'static str,
    },

    /// Configuration is invalid or could not be read.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Could not reach or start the MCP server.
    #[error("MCP connection failed: {0}")]
    Connect(String),

    /// The tool-calling loop failed.
    #[error(transparent)]
    Conversation(#[from] runtime::ConversationError),

    /// The MCP server failed.
    #[error(transparent)]
    Server(#[from] mcp::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
