//! MCP server handlers.
//!
//! Wires settings and the workspace into a generator and serves it over stdio.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use microagent::{CompletionStreamer, Settings, TestGenerator, WorkspaceFs};

use super::server::MicroagentMcpServer;

/// Run the MCP server over stdio.
///
/// Fails before serving if the backend cannot be configured, e.g. when no API
/// key is set outside mock mode.
pub async fn run_mcp_server(settings: Settings, workspace_root: PathBuf) -> Result<()> {
    info!("🔧 Starting Microagent MCP Tool Server...");
    info!("📁 Workspace: {}", workspace_root.display());

    let backend = settings
        .backend()
        .context("Failed to configure completion backend")?;
    let fs = Arc::new(WorkspaceFs::new(workspace_root));
    let streamer = CompletionStreamer::new(backend, settings.completion_config());
    let generator = Arc::new(TestGenerator::new(fs, streamer));

    run_server(MicroagentMcpServer::new(generator)).await
}

/// Run the MCP server with the given server instance.
async fn run_server(server: MicroagentMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("✅ MCP tool server started");
    info!("🔗 Ready for MCP client connections");

    // Start the service
    let service = server.serve(stdio()).await.map_err(|e| {
        error!("Failed to start MCP service: {:?}", e);
        anyhow::anyhow!("Failed to start MCP service: {:?}", e)
    })?;

    // Wait for service to complete
    service.waiting().await.map_err(|e| {
        error!("MCP service error: {:?}", e);
        anyhow::anyhow!("MCP service error: {:?}", e)
    })?;

    info!("MCP server shutting down");
    Ok(())
}
