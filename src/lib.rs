//! Unit test generation for editor hosts.
//!
//! A request (prompt plus optional attached file content) is turned into a
//! chat prompt enriched with example tests from the project, streamed through
//! a completion backend, and reduced to the code inside the first fenced block.

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod panel;
pub mod progress;
pub mod prompt;
pub mod streamer;
pub mod workspace;

pub use agent::TestGenerator;
pub use config::{CompletionConfig, Settings};
pub use error::{AgentError, AgentErrorKind, CompletionError, ConfigError, Stage};
pub use extract::extract_code_block;
pub use panel::{ContextBuffer, PanelController, PanelEvent, PanelMessage};
pub use progress::{ProgressSink, ProgressTicker};
pub use prompt::{AgentRequest, Message, Role};
pub use streamer::CompletionStreamer;
pub use workspace::{FileSystem, WorkspaceFs};
