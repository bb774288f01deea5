//! Completion backends.
//!
//! The pipeline talks to the model through [`CompletionBackend`]. Two
//! implementations exist: [`OpenAiBackend`] streams from an OpenAI-compatible
//! chat completions endpoint, [`MockBackend`] answers with canned text. The
//! caller picks one at construction time.

mod client;
mod mock;
mod stream;
mod types;

pub use client::{OpenAiBackend, DEFAULT_BASE_URL};
pub use mock::{MockBackend, MOCK_RESPONSE};
pub use stream::{parse_sse_line, sse_fragments, SseLine};
pub use types::SamplingParams;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::CompletionError;
use crate::prompt::Message;

/// Lazy, finite, non-restartable sequence of text fragments.
pub type FragmentStream = BoxStream<'static, Result<String, CompletionError>>;

/// What a backend hands back for a chat request.
pub enum Completion {
    /// Complete text available immediately; nothing is streamed.
    Canned(String),
    /// Fragments arriving incrementally, in order.
    Streaming(FragmentStream),
}

/// A chat completion call.
#[derive(Debug, Clone, Copy)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub sampling: SamplingParams,
}

/// Capability to run a chat completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Start a completion. Fails if the call cannot be established.
    async fn stream_chat(&self, request: ChatRequest<'_>) -> Result<Completion, CompletionError>;
}
