//! Server-sent event decoding for streaming completions.
//!
//! The body arrives as arbitrary byte chunks. Complete lines are cut out of a
//! buffer, each `data:` line is decoded, and the text fragments are yielded in
//! arrival order.

use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;
use tracing::debug;

use super::types::ChatCompletionChunk;
use super::FragmentStream;
use crate::error::CompletionError;

/// Meaning of a single line of the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    Fragment(String),
    Done,
    Error(String),
    Skip,
}

/// Decode one line of the event stream.
pub fn parse_sse_line(line: &str) -> SseLine {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return SseLine::Skip;
    };

    let data = data.trim();
    if data == "[DONE]" {
        return SseLine::Done;
    }

    match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => match chunk.error {
            Some(error) => SseLine::Error(error.message),
            None => chunk
                .into_fragment()
                .map(SseLine::Fragment)
                .unwrap_or(SseLine::Skip),
        },
        Err(e) => {
            debug!("Skipping unparseable stream line: {}", e);
            SseLine::Skip
        }
    }
}

struct SseState {
    bytes: BoxStream<'static, reqwest::Result<Vec<u8>>>,
    buffer: Vec<u8>,
    pending: VecDeque<Result<String, CompletionError>>,
    finished: bool,
}

impl SseState {
    fn push_line(&mut self, line: &[u8]) {
        match parse_sse_line(&String::from_utf8_lossy(line)) {
            SseLine::Fragment(fragment) => self.pending.push_back(Ok(fragment)),
            SseLine::Done => self.finished = true,
            SseLine::Error(message) => {
                self.pending.push_back(Err(CompletionError::Stream(message)));
                self.finished = true;
            }
            SseLine::Skip => {}
        }
    }

    /// Process complete lines from buffer
    fn drain_lines(&mut self) {
        while !self.finished {
            let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            self.push_line(&line);
        }
    }

    fn drain_remainder(&mut self) {
        if !self.finished && !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.push_line(&rest);
        }
        self.finished = true;
    }
}

/// Turn a raw event-stream body into a stream of text fragments.
///
/// The stream ends at `data: [DONE]` or when the body ends. A transport error
/// or an in-band error object ends it with a [`CompletionError::Stream`].
pub fn sse_fragments<S>(bytes: S) -> FragmentStream
where
    S: Stream<Item = reqwest::Result<Vec<u8>>> + Send + 'static,
{
    let state = SseState {
        bytes: bytes.boxed(),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.pending.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    state.drain_lines();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(CompletionError::Stream(e.to_string())), state));
                }
                None => state.drain_remainder(),
            }
        }
    })
    .boxed()
}
