//! MCP (Model Context Protocol) server for the Metabolomics Workbench.
//!
//! This crate exposes every study lookup in [`workbench::Endpoint`] as an MCP
//! tool, served over stdio or streamable HTTP.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{ServeConfig, Transport};
//!
//! # async fn example() -> mcp::Result<()> {
//! let config = ServeConfig {
//!     transport: Transport::StreamableHttp,
//!     port: 9000,
//!     ..ServeConfig::default()
//! };
//!
//! mcp::serve(config).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod server;
mod transport;

pub use error::{Error, Result};
pub use server::{StudyIdParams, WorkbenchServer};
pub use transport::{DEFAULT_HOST, DEFAULT_PORT, MCP_PATH, ServeConfig, Transport, router, serve};
