//! MCP server error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid transport '{0}': expected 'stdio' or 'streamable-http'")]
    InvalidTransport(String),

    #[error("failed to start MCP service: {0}")]
    Start(String),

    #[error("MCP service failed: {0}")]
    Service(String),

    #[error(transparent)]
    Workbench(#[from] workbench::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
