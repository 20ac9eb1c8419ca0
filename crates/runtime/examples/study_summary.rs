//! Call one Workbench tool on a running MCP server.
//!
//! Run with: REMOTE_MCP_URL=http://localhost:8080/mcp cargo run --example study_summary -- ST000001

use runtime::{McpToolHost, ToolCall, ToolHost};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let url =
        std::env::var("REMOTE_MCP_URL").unwrap_or_else(|_| "http://localhost:8080/mcp".into());
    let study_id = std::env::args().nth(1).unwrap_or_else(|| "ST000001".into());

    println!("Connecting to {url}");
    let host = McpToolHost::connect(url).await?;

    println!("\nDiscovered {} tools:", host.specs().len());
    for spec in host.specs() {
        println!("  - {}", spec.name);
    }

    let call = ToolCall {
        id: "example".into(),
        name: "get_study_summary".into(),
        input: serde_json::json!({ "study_id": study_id }),
    };
    match host.execute(&call).await {
        Ok(output) => println!("\n{}", serde_json::to_string_pretty(&output)?),
        Err(e) => println!("\nError: {e}"),
    }

    host.shutdown().await?;
    Ok(())
}
