mod config;
mod error;
mod logging;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use mcp::{DEFAULT_HOST, DEFAULT_PORT, ServeConfig, Transport};
use runtime::{BackendSettings, Conversation, McpToolHost, Outcome, Provider, ProviderBackend};
use tracing::{debug, info};
use workbench::{DEFAULT_BASE_URL, DEFAULT_STUDY_ID, Endpoint, WorkbenchConfig};

use config::Config;
use error::{Error, Result};

const DEFAULT_ASK_STUDY: &str = "ST000001";

#[derive(Parser)]
#[command(name = "mwb-mcp")]
#[command(about = "Metabolomics Workbench tools over MCP", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v, -vv). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Defaults to `serve`, configured from the environment.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// `serve` settings for a bare invocation, read from the environment only.
#[derive(Parser)]
#[command(name = "mwb-mcp")]
struct EnvServe {
    #[command(flatten)]
    args: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server
    Serve(ServeArgs),
    /// Ask a model a question, letting it call the Workbench tools
    Ask(AskArgs),
    /// List the tools the server exposes
    Tools,
}

#[derive(clap::Args)]
struct ServeArgs {
    /// Transport: stdio or streamable-http
    #[arg(long, env = "MCP_TRANSPORT", default_value = "stdio")]
    transport: Transport,

    /// Bind address for streamable-http
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    /// Port for streamable-http
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Metabolomics Workbench REST base URL
    #[arg(long, env = "MWB_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Upstream request timeout in seconds (0 disables)
    #[arg(long, env = "MWB_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(clap::Args)]
struct AskArgs {
    /// Study the default prompt asks about
    #[arg(default_value = DEFAULT_ASK_STUDY)]
    study_id: String,

    /// Prompt to send instead of the default study summary question
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model provider: anthropic, openai or gemini
    #[arg(long)]
    provider: Option<Provider>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Maximum model calls for the exchange
    #[arg(long)]
    max_turns: Option<usize>,

    /// Remote MCP endpoint; without one a local server is spawned
    #[arg(long, env = "REMOTE_MCP_URL")]
    mcp_url: Option<String>,

    /// Config file (defaults to ./mwb.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    match cli.command {
        Some(Commands::Serve(args)) => cmd_serve(args).await,
        None => cmd_serve(EnvServe::parse_from(["mwb-mcp"]).args).await,
        Some(Commands::Ask(args)) => cmd_ask(args).await,
        Some(Commands::Tools) => {
            cmd_tools();
            Ok(())
        }
    }
}

async fn cmd_serve(args: ServeArgs) -> Result<()> {
    let workbench =
        WorkbenchConfig::new(args.base_url).with_timeout(Duration::from_secs(args.timeout_secs));

    mcp::serve(ServeConfig {
        transport: args.transport,
        host: args.host,
        port: args.port,
        workbench,
    })
    .await?;
    Ok(())
}

async fn cmd_ask(args: AskArgs) -> Result<()> {
    let mut config = Config::discover(args.config.as_deref())?;

    if let Some(provider) = args.provider {
        // A model named in the file belongs to the file's provider.
        if provider != config.backend.provider {
            config.backend.model = None;
            config.backend.api_key = None;
        }
        config.backend.provider = provider;
    }
    if let Some(model) = args.model {
        config.backend.model = Some(model);
    }
    if let Some(max_turns) = args.max_turns {
        config.caller.max_turns = max_turns;
    }
    if let Some(url) = args.mcp_url {
        config.caller.mcp_url = Some(url);
    }

    let provider = config.backend.provider;
    let api_key = config.api_key().ok_or(Error::MissingApiKey {
        provider,
        env: provider.api_key_env(),
    })?;
    let model = config
        .backend
        .model
        .clone()
        .unwrap_or_else(|| provider.default_model().to_string());

    let backend = ProviderBackend::new(BackendSettings {
        provider,
        api_key,
        model,
        max_tokens: config.backend.max_tokens,
        system: config.backend.system.clone(),
    });

    let tools = match &config.caller.mcp_url {
        Some(url) => {
            info!(%url, "connecting to MCP server");
            McpToolHost::connect(url.as_str()).await
        }
        None => {
            let exe = std::env::current_exe()?;
            info!(exe = %exe.display(), "spawning local MCP server");
            McpToolHost::spawn(exe.to_string_lossy(), ["serve", "--transport", "stdio"]).await
        }
    }
    .map_err(|e| Error::Connect(e.to_string()))?;

    let conversation = Conversation::new(backend, tools)
        .with_max_turns(config.caller.max_turns)
        .with_allowed_tools(config.caller.allowed_tools.iter().cloned());

    let prompt = args
        .prompt
        .unwrap_or_else(|| format!("Can you give me the summary of study {}?", args.study_id));
    debug!(%prompt, tools = conversation.specs().len(), "asking");

    let result = conversation.ask(&prompt).await;
    if let Err(e) = conversation.into_tools().shutdown().await {
        debug!(error = %e, "MCP shutdown failed");
    }
    let exchange = result?;

    match &exchange.outcome {
        Outcome::Answer(text) => println!("{text}"),
        Outcome::TurnLimitReached { max_turns } => {
            println!("No answer after {max_turns} turns; the model was still calling tools.")
        }
    }
    info!(
        turns = exchange.turns,
        input_tokens = exchange.usage.input_tokens,
        output_tokens = exchange.usage.output_tokens,
        "exchange finished"
    );
    Ok(())
}

fn cmd_tools() {
    println!("{:<32}  {:<44}  PARAMETER", "TOOL", "PATH");
    println!("{}", "-".repeat(96));

    for endpoint in Endpoint::ALL {
        let (path, param) = if endpoint.takes_study_id() {
            (
                endpoint.path(Some("{study_id}")),
                format!("study_id (default {DEFAULT_STUDY_ID})"),
            )
        } else {
            (endpoint.path(None), "-".to_string())
        };
        println!("{:<32}  {path:<44}  {param}", endpoint.tool_name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_rejects_unknown_transport() {
        let parsed = Cli::try_parse_from(["mwb-mcp", "serve", "--transport", "sse"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn bare_invocation_defaults_to_serve() {
        let cli = Cli::try_parse_from(["mwb-mcp", "-v"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn only_serve_reads_server_environment() {
        use clap::CommandFactory;

        let command = Cli::command();
        let env_args = |cmd: &clap::Command| -> Vec<String> {
            cmd.get_arguments()
                .filter_map(|a| a.get_env())
                .map(|e| e.to_string_lossy().into_owned())
                .collect()
        };

        assert!(env_args(&command).is_empty());
        for name in ["ask", "tools"] {
            let sub = command.find_subcommand(name).unwrap();
            let vars = env_args(sub);
            assert!(!vars.iter().any(|v| v == "MCP_TRANSPORT" || v == "PORT"), "{name}: {vars:?}");
        }

        let serve = env_args(command.find_subcommand("serve").unwrap());
        assert!(serve.iter().any(|v| v == "MCP_TRANSPORT"));
        assert!(env_args(&EnvServe::command()).iter().any(|v| v == "PORT"));
    }

    #[test]
    fn serve_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "mwb-mcp",
            "serve",
            "--transport",
            "streamable-http",
            "--port",
            "9000",
        ])
        .unwrap();
        let Some(Commands::Serve(args)) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.transport, Transport::StreamableHttp);
        assert_eq!(args.port, 9000);
    }

    #[test]
    fn ask_defaults_to_first_study() {
        let cli = Cli::try_parse_from(["mwb-mcp", "ask", "--provider", "openai"]).unwrap();
        let Some(Commands::Ask(args)) = cli.command else {
            panic!("expected ask");
        };
        assert_eq!(args.study_id, DEFAULT_ASK_STUDY);
        assert_eq!(args.provider, Some(Provider::OpenAi));
    }
}
