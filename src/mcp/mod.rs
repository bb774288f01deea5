//! MCP (Model Context Protocol) server implementation using rmcp.
//!
//! Exposes test generation and file search to editor hosts over stdio.

mod handlers;
mod server;
mod tools;
pub mod types;

pub use handlers::run_mcp_server;
