//! Wire types for the chat completions endpoint.

use serde::{Deserialize, Serialize};

use crate::prompt::Message;

/// Sampling parameters sent with every request.
///
/// The defaults pin temperature to zero and fix the seed so identical input
/// reproduces identical output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub seed: u64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            seed: 42,
        }
    }
}

/// Chat completion request body
#[derive(Debug, Serialize)]
pub(super) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [Message],
    pub temperature: f32,
    pub seed: u64,
    pub stream: bool,
}

/// One server-sent chunk of a streaming completion
#[derive(Debug, Deserialize)]
pub(super) struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub error: Option<StreamErrorBody>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Error object some backends emit inside the stream
#[derive(Debug, Deserialize)]
pub(super) struct StreamErrorBody {
    #[serde(default)]
    pub message: String,
}

impl ChatCompletionChunk {
    /// Text of the first choice, if it carries any.
    pub fn into_fragment(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.delta.content)
            .filter(|content| !content.is_empty())
    }
}
