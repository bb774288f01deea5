//! File search tool implementation.

use rmcp::{model::*, ErrorData as McpError};

use microagent::workspace::{display_path, search_files, FileSystem};

use crate::mcp::types::FindFilesArgs;

use super::common::{tool_error, tool_text};

/// List workspace files whose name starts with the query
pub async fn find_files(fs: &dyn FileSystem, args: FindFilesArgs) -> Result<CallToolResult, McpError> {
    let query = args.query.trim();
    if query.is_empty() {
        return Ok(tool_error("Error: Cannot search for an empty query"));
    }

    match search_files(fs, query).await {
        Ok(paths) if paths.is_empty() => Ok(tool_text(format!("No files found matching '{}'", query))),
        Ok(paths) => {
            let listing: Vec<String> = paths.iter().map(|p| display_path(p)).collect();
            Ok(tool_text(listing.join("\n")))
        }
        Err(e) => Ok(tool_error(format!("Error searching files: {}", e))),
    }
}
