use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, warn};

use super::{ChatRequest, Completion, CompletionBackend};
use crate::error::CompletionError;

/// Placeholder returned in mock mode when no record file supplies a response.
pub const MOCK_RESPONSE: &str = "mocked response";

/// Backend that never touches the network.
#[derive(Debug, Clone)]
pub struct MockBackend {
    response: String,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            response: MOCK_RESPONSE.to_string(),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    /// Use the content of `record_path` as the canned response.
    ///
    /// Falls back to [`MOCK_RESPONSE`] when the file is absent, unreadable or empty.
    pub fn from_record_file(record_path: Option<&Path>) -> Self {
        let Some(path) = record_path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) if !content.trim().is_empty() => {
                debug!("Using mock response from {}", path.display());
                Self::with_response(content.trim())
            }
            Ok(_) => {
                warn!("Mock record file {} is empty", path.display());
                Self::default()
            }
            Err(e) => {
                warn!("Failed to read mock record file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn stream_chat(&self, request: ChatRequest<'_>) -> Result<Completion, CompletionError> {
        debug!(
            "Mock completion for {} messages (model {})",
            request.messages.len(),
            request.model
        );
        Ok(Completion::Canned(self.response.clone()))
    }
}
