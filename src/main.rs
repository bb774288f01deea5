use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod mcp;

use cli::{resolve_workspace_root, Cli};
use microagent::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Environment variables win over .env entries
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {}", e),
    }

    let settings = Settings::from_env()
        .with_model(cli.model)
        .with_mock(cli.mock);
    let workspace_root = resolve_workspace_root(cli.workspace_root)?;

    mcp::run_mcp_server(settings, workspace_root).await
}
