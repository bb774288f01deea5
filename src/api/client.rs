use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;
use uuid::Uuid;

use super::stream::sse_fragments;
use super::types::ChatCompletionRequest;
use super::{ChatRequest, Completion, CompletionBackend};
use crate::error::{CompletionError, ConfigError};

/// Default base URL of the OpenAI API
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";

/// Timeout for establishing a connection. The stream itself is unbounded.
const CONNECT_TIMEOUT_SECS: u64 = 30;

const CHAT_COMPLETIONS_ENDPOINT: &str = "chat/completions";

/// Streaming client for an OpenAI-compatible chat completions endpoint
pub struct OpenAiBackend {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl OpenAiBackend {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let endpoint = Self::build_url(base_url, CHAT_COMPLETIONS_ENDPOINT)?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Self {
            client,
            endpoint,
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Join `endpoint` onto `base_url`, keeping any path prefix such as `/v1`.
    fn build_url(base_url: &str, endpoint: &str) -> Result<Url, ConfigError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let invalid = |source| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        };
        Url::parse(&normalized)
            .map_err(invalid)?
            .join(endpoint)
            .map_err(invalid)
    }
}

#[async_trait]
impl CompletionBackend for OpenAiBackend {
    async fn stream_chat(&self, request: ChatRequest<'_>) -> Result<Completion, CompletionError> {
        let request_id = Uuid::new_v4().to_string();
        let body = ChatCompletionRequest {
            model: request.model,
            messages: request.messages,
            temperature: request.sampling.temperature,
            seed: request.sampling.seed,
            stream: true,
        };

        debug!("=== Chat Completion Request ===");
        debug!("URL: {}", self.endpoint);
        debug!("Model: {}", request.model);
        debug!("Messages: {}", request.messages.len());

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("Content-Type", "application/json")
            .header("x-request-id", &request_id)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(CompletionError::Request)?;

        let status = response.status();
        debug!("=== Chat Completion Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                "Chat completion request failed with status {}: {}",
                status, error_text
            );
            return Err(CompletionError::from_http_response(
                status.as_u16(),
                error_text,
            ));
        }

        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()));
        Ok(Completion::Streaming(sse_fragments(bytes)))
    }
}
