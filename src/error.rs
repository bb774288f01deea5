//! Error types for test generation.
//!
//! Scanning and manifest failures never show up here: they are logged and
//! absorbed where they happen. What remains is what the caller has to present.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the completion backend or of the stream it produced.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// The request could not be sent or the connection dropped before a response.
    #[error("completion request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// The backend answered with a non-success HTTP status.
    #[error("completion backend returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The stream was established but broke off.
    #[error("completion stream interrupted: {0}")]
    Stream(String),

    /// The call succeeded but yielded no content at all.
    #[error("completion backend returned no content")]
    Empty,
}

impl CompletionError {
    /// Build a status error, translating auth failures into something actionable.
    pub fn from_http_response(status: u16, body: String) -> Self {
        let message = match status {
            401 => "Authentication failed. Check that OPENAI_API_KEY is valid.".to_string(),
            403 => "Permission denied for the configured model.".to_string(),
            429 => "Rate limit exceeded. Please wait and try again.".to_string(),
            _ if body.trim().is_empty() => "Unknown error".to_string(),
            _ => body,
        };
        CompletionError::Status { status, message }
    }

    /// Whether the backend itself failed, as opposed to answering with nothing.
    pub fn is_backend_failure(&self) -> bool {
        !matches!(self, CompletionError::Empty)
    }
}

/// Configuration problems detected before any backend call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("OPENAI_API_KEY is not set in the environment variables")]
    MissingApiKey,

    #[error("invalid completion base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Pipeline stage at which a request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Attaching,
    Scanning,
    Building,
    Streaming,
    Extracting,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Validating => "validating",
            Stage::Attaching => "attaching",
            Stage::Scanning => "scanning",
            Stage::Building => "building",
            Stage::Streaming => "streaming",
            Stage::Extracting => "extracting",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AgentErrorKind {
    #[error("prompt is missing")]
    InvalidPrompt,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// A failed generation request, tagged with the stage that failed.
#[derive(Debug, Error)]
#[error("{stage} failed: {kind}")]
pub struct AgentError {
    pub stage: Stage,
    #[source]
    pub kind: AgentErrorKind,
}

impl AgentError {
    pub fn new(stage: Stage, kind: impl Into<AgentErrorKind>) -> Self {
        Self {
            stage,
            kind: kind.into(),
        }
    }

    pub fn invalid_prompt() -> Self {
        Self::new(Stage::Validating, AgentErrorKind::InvalidPrompt)
    }

    pub fn io(stage: Stage, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::new(
            stage,
            AgentErrorKind::Io {
                path: path.into(),
                source,
            },
        )
    }

    pub fn is_invalid_prompt(&self) -> bool {
        matches!(self.kind, AgentErrorKind::InvalidPrompt)
    }

    /// The completion failure behind this error, if any.
    pub fn completion(&self) -> Option<&CompletionError> {
        match &self.kind {
            AgentErrorKind::Completion(e) => Some(e),
            _ => None,
        }
    }
}
