//! MCP tool parameter types.
//!
//! These types are used with rmcp's `Parameters<T>` wrapper for automatic
//! deserialization and JSON schema generation.

use schemars::JsonSchema;
use serde::Deserialize;

/// Parameters for the generate_test tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GenerateTestArgs {
    /// Description of the function to write a unit test for
    pub prompt: String,
    /// Optional file, relative to the workspace root, whose content the test should target
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Parameters for the find_files tool
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindFilesArgs {
    /// Beginning of the file name to look for
    pub query: String,
}
