use clap::Parser;

/// Microagent - unit test generation served over MCP
#[derive(Parser)]
#[command(name = "microagent")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Workspace root (auto-detects git root if absent)
    #[arg(short = 'w', long)]
    pub workspace_root: Option<String>,

    /// Select model to use (overrides MODEL)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Answer with a canned completion instead of calling the model
    #[arg(long)]
    pub mock: bool,
}
