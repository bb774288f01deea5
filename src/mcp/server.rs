//! MCP server implementation.
//!
//! This module contains the MicroagentMcpServer struct and its tool routing.

use rmcp::{
    handler::server::router::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use microagent::TestGenerator;

use super::tools;
use super::types::*;

/// Microagent MCP Server
#[derive(Clone)]
pub struct MicroagentMcpServer {
    generator: Arc<TestGenerator>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl MicroagentMcpServer {
    pub fn new(generator: Arc<TestGenerator>) -> Self {
        Self {
            generator,
            tool_router: Self::tool_router(),
        }
    }

    /// Generate a unit test for a described function
    #[tool(
        name = "generate_test",
        description = "Generate a unit test file for a function described in natural language.\n\nThe test follows the style of existing *.test.* / *.spec.* files in the workspace, or the testing library declared in the project manifest when there are none. Pass `file_path` to include an existing source file as context; the test is placed next to it.\n\nReturns only the test code."
    )]
    async fn generate_test(
        &self,
        Parameters(args): Parameters<GenerateTestArgs>,
    ) -> Result<CallToolResult, McpError> {
        let start_time = Instant::now();
        let result = tools::generate_test(&self.generator, args).await;
        info!(
            "generate_test finished in {} ms",
            start_time.elapsed().as_millis()
        );
        result
    }

    /// Find workspace files by name prefix
    #[tool(
        name = "find_files",
        description = "Find files in the workspace whose name starts with the query. Skips node_modules and dist. Returns at most 100 paths relative to the workspace root, one per line."
    )]
    async fn find_files(
        &self,
        Parameters(args): Parameters<FindFilesArgs>,
    ) -> Result<CallToolResult, McpError> {
        tools::find_files(self.generator.file_system().as_ref(), args).await
    }
}

#[tool_handler]
impl ServerHandler for MicroagentMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "microagent".to_string(),
                title: None,
                version: env!("CARGO_PKG_VERSION").to_string(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Microagent MCP Server generates unit tests that match the conventions of the workspace."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use microagent::api::{MockBackend, MOCK_RESPONSE};
    use microagent::{CompletionConfig, CompletionStreamer, WorkspaceFs};
    use std::fs;
    use tempfile::TempDir;

    fn server(root: &std::path::Path) -> MicroagentMcpServer {
        let fs = Arc::new(WorkspaceFs::new(root));
        let streamer = CompletionStreamer::new(Arc::new(MockBackend::new()), CompletionConfig::default());
        MicroagentMcpServer::new(Arc::new(TestGenerator::new(fs, streamer)))
    }

    fn text_of(result: &CallToolResult) -> String {
        result
            .content
            .first()
            .and_then(|c| serde_json::to_value(c).ok())
            .and_then(|v| v["text"].as_str().map(str::to_string))
            .unwrap_or_default()
    }

    #[test]
    fn test_server_info() {
        let temp = TempDir::new().unwrap();
        let info = server(temp.path()).get_info();
        assert_eq!(info.server_info.name, "microagent");
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_generate_test_with_mock() {
        let temp = TempDir::new().unwrap();
        let server = server(temp.path());

        let result = server
            .generate_test(Parameters(GenerateTestArgs {
                prompt: "sum two numbers".to_string(),
                file_path: None,
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        assert_eq!(text_of(&result), MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn test_generate_test_rejects_empty_prompt() {
        let temp = TempDir::new().unwrap();
        let result = server(temp.path())
            .generate_test(Parameters(GenerateTestArgs {
                prompt: "  ".to_string(),
                file_path: None,
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
    }

    #[tokio::test]
    async fn test_generate_test_missing_file_is_tool_error() {
        let temp = TempDir::new().unwrap();
        let result = server(temp.path())
            .generate_test(Parameters(GenerateTestArgs {
                prompt: "sum".to_string(),
                file_path: Some("src/missing.ts".to_string()),
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).contains("src/missing.ts"));
    }

    #[tokio::test]
    async fn test_generate_test_refuses_files_outside_workspace() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("project")).unwrap();
        fs::write(temp.path().join("secret.env"), "OPENAI_API_KEY=sk-live").unwrap();
        let server = server(&temp.path().join("project"));

        for file_path in [
            "../secret.env".to_string(),
            temp.path().join("secret.env").display().to_string(),
        ] {
            let result = server
                .generate_test(Parameters(GenerateTestArgs {
                    prompt: "sum".to_string(),
                    file_path: Some(file_path),
                }))
                .await
                .unwrap();

            assert_eq!(result.is_error, Some(true));
            assert!(!text_of(&result).contains("sk-live"));
        }
    }

    #[tokio::test]
    async fn test_find_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/parser.ts"), "").unwrap();
        fs::write(temp.path().join("src/printer.ts"), "").unwrap();
        let server = server(temp.path());

        let result = server
            .find_files(Parameters(FindFilesArgs {
                query: "pars".to_string(),
            }))
            .await
            .unwrap();
        assert_eq!(text_of(&result), "src/parser.ts");

        let result = server
            .find_files(Parameters(FindFilesArgs {
                query: "zzz".to_string(),
            }))
            .await
            .unwrap();
        assert!(text_of(&result).starts_with("No files found"));
    }
}
