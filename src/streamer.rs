//! Runs one chat completion to the end, forwarding fragments as they arrive.

use futures_util::StreamExt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::api::{ChatRequest, Completion, CompletionBackend, SamplingParams};
use crate::config::CompletionConfig;
use crate::error::CompletionError;
use crate::prompt::Message;

/// Drives a [`CompletionBackend`] and accumulates its output.
pub struct CompletionStreamer {
    backend: Arc<dyn CompletionBackend>,
    config: CompletionConfig,
    sampling: SamplingParams,
}

impl CompletionStreamer {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: CompletionConfig) -> Self {
        Self {
            backend,
            config,
            sampling: SamplingParams::default(),
        }
    }

    pub fn config(&self) -> &CompletionConfig {
        &self.config
    }

    /// Run a completion and return the full text.
    ///
    /// Every non-empty fragment is passed to `on_chunk` exactly once, in
    /// arrival order, before the next one is requested. Canned responses are
    /// returned as-is and never reach `on_chunk`.
    pub async fn run<F>(&self, messages: &[Message], mut on_chunk: F) -> Result<String, CompletionError>
    where
        F: FnMut(&str) + Send,
    {
        let request = ChatRequest {
            model: &self.config.model,
            messages,
            sampling: self.sampling,
        };

        match self.backend.stream_chat(request).await? {
            Completion::Canned(text) => {
                debug!("Received canned completion ({} bytes)", text.len());
                if text.is_empty() {
                    return Err(CompletionError::Empty);
                }
                Ok(text)
            }
            Completion::Streaming(mut fragments) => {
                let mut accumulated = String::new();
                let mut count = 0usize;

                while let Some(fragment) = fragments.next().await {
                    let fragment = match fragment {
                        Ok(fragment) => fragment,
                        Err(e) => {
                            warn!("Completion stream failed after {} fragments: {}", count, e);
                            return Err(e);
                        }
                    };
                    if fragment.is_empty() {
                        continue;
                    }
                    accumulated.push_str(&fragment);
                    on_chunk(&fragment);
                    count += 1;
                }

                debug!(
                    "Completion stream finished: {} fragments, {} bytes",
                    count,
                    accumulated.len()
                );
                if accumulated.is_empty() {
                    return Err(CompletionError::Empty);
                }
                Ok(accumulated)
            }
        }
    }
}
