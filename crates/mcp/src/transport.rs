//! Transport selection and the serve loop.

use std::str::FromStr;

use rmcp::ServiceExt;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio::net::TcpListener;
use tracing::info;
use workbench::{WorkbenchClient, WorkbenchConfig};

use crate::error::{Error, Result};
use crate::server::WorkbenchServer;

/// Default bind host for the HTTP transport.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port for the HTTP transport.
pub const DEFAULT_PORT: u16 = 8080;

/// Path the streamable HTTP endpoint is mounted at.
pub const MCP_PATH: &str = "/mcp";

/// How the server talks to its client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout.
    #[default]
    Stdio,
    /// MCP streamable HTTP.
    StreamableHttp,
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "stdio" => Ok(Self::Stdio),
            "streamable-http" => Ok(Self::StreamableHttp),
            other => Err(Error::InvalidTransport(other.to_string())),
        }
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::StreamableHttp => write!(f, "streamable-http"),
        }
    }
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServeConfig {
    pub transport: Transport,
    pub host: String,
    pub port: u16,
    pub workbench: WorkbenchConfig,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            workbench: WorkbenchConfig::default(),
        }
    }
}

/// Run the server until the client disconnects (stdio) or Ctrl+C (HTTP).
pub async fn serve(config: ServeConfig) -> Result<()> {
    let client = WorkbenchClient::new(config.workbench)?;
    info!(
        transport = %config.transport,
        base_url = client.base_url(),
        "starting Metabolomics Workbench MCP server"
    );

    match config.transport {
        Transport::Stdio => serve_stdio(client).await,
        Transport::StreamableHttp => serve_http(client, &config.host, config.port).await,
    }
}

async fn serve_stdio(client: WorkbenchClient) -> Result<()> {
    let service = WorkbenchServer::new(client)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| Error::Start(e.to_string()))?;

    let reason = service
        .waiting()
        .await
        .map_err(|e| Error::Service(e.to_string()))?;
    info!(?reason, "stdio session ended");
    Ok(())
}

/// Axum router serving the streamable HTTP endpoint at [`MCP_PATH`].
pub fn router(client: WorkbenchClient) -> axum::Router {
    let service = StreamableHttpService::new(
        move || Ok(WorkbenchServer::new(client.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    axum::Router::new().nest_service(MCP_PATH, service)
}

async fn serve_http(client: WorkbenchClient, host: &str, port: u16) -> Result<()> {
    let router = router(client);

    let listener = TcpListener::bind((host, port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, path = MCP_PATH, "listening for streamable HTTP clients");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
