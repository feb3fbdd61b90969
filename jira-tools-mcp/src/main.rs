//! Jira Tools MCP Server - Jira issues and ADF rich text over MCP STDIO

use jira_tools_mcp::JiraToolsServer;
use pulseengine_mcp_server::McpServerBuilder;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries the protocol, logs go to stderr
    JiraToolsServer::configure_stdio_logging();

    info!("Starting Jira Tools MCP Server...");

    let jira_server = match JiraToolsServer::new().await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create Jira Tools MCP Server: {}", e);
            eprintln!("❌ Failed to start Jira Tools MCP Server: {}", e);
            eprintln!("\nPlease check:");
            eprintln!("  - JIRA_URL environment variable is set");
            eprintln!("  - Jira authentication is configured (JIRA_AUTH_TYPE, JIRA_TOKEN, JIRA_EMAIL/JIRA_API_TOKEN)");
            eprintln!("  - Jira instance is accessible");
            std::process::exit(1);
        }
    };

    let mut server = jira_server.serve_stdio().await?;

    info!("Jira Tools MCP Server is running on STDIO");

    server.run().await?;

    Ok(())
}
