//! Chat panel state and message flow.
//!
//! The host renders [`PanelEvent`]s and forwards user actions to a
//! [`PanelController`]. The controller owns the context buffer and threads it
//! into each generation request; the pipeline itself only reads it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info};
use uuid::Uuid;

use crate::agent::TestGenerator;
use crate::error::{AgentError, Stage};
use crate::prompt::AgentRequest;
use crate::workspace::{display_path, search_files};

/// Kind of a panel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    User,
    Code,
    Test,
    Admin,
    UpdateMessage,
}

/// A message shown in the chat panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelMessage {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl PanelMessage {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Generated test and code messages offer a thumbs up/down.
    pub fn accepts_feedback(&self) -> bool {
        matches!(self.kind, MessageKind::Test | MessageKind::Code)
    }
}

/// Something the host should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    Message(PanelMessage),
    /// A streamed fragment of the completion in progress.
    Chunk(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feedback {
    Positive,
    Negative,
}

/// Feedback given on a panel message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEvent {
    pub message_id: Uuid,
    pub kind: MessageKind,
    pub feedback: Feedback,
}

pub type FeedbackHook = Box<dyn Fn(&FeedbackEvent) + Send + Sync>;

/// Attached file contents accumulated across requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextBuffer {
    content: String,
    files: Vec<PathBuf>,
}

impl ContextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a file's content, separated from the previous file by a blank line.
    pub fn append(&mut self, path: impl Into<PathBuf>, content: &str) {
        if !self.files.is_empty() {
            self.content.push_str("\n\n");
        }
        self.content.push_str(content);
        self.files.push(path.into());
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn last_file(&self) -> Option<&Path> {
        self.files.last().map(PathBuf::as_path)
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Build a generation request carrying this context.
    pub fn request(&self, prompt: &str) -> AgentRequest {
        AgentRequest {
            prompt: Some(prompt.to_string()).filter(|p| !p.trim().is_empty()),
            file_content: self.content.clone(),
            file_location: self.last_file().map(Path::to_path_buf),
        }
    }
}

/// Drives the chat panel: attaching files, sending prompts, collecting feedback.
pub struct PanelController {
    generator: Arc<TestGenerator>,
    context: ContextBuffer,
    history: Vec<PanelMessage>,
    outbox: UnboundedSender<PanelEvent>,
    feedback_hook: Option<FeedbackHook>,
}

impl PanelController {
    /// Create a controller and the receiving end of its event stream.
    pub fn new(generator: Arc<TestGenerator>) -> (Self, UnboundedReceiver<PanelEvent>) {
        let (outbox, events) = mpsc::unbounded_channel();
        let controller = Self {
            generator,
            context: ContextBuffer::new(),
            history: Vec::new(),
            outbox,
            feedback_hook: None,
        };
        (controller, events)
    }

    pub fn on_feedback<F>(mut self, hook: F) -> Self
    where
        F: Fn(&FeedbackEvent) + Send + Sync + 'static,
    {
        self.feedback_hook = Some(Box::new(hook));
        self
    }

    pub fn context(&self) -> &ContextBuffer {
        &self.context
    }

    pub fn history(&self) -> &[PanelMessage] {
        &self.history
    }

    fn post(&mut self, kind: MessageKind, text: impl Into<String>) -> Uuid {
        let message = PanelMessage::new(kind, text);
        let id = message.id;
        self.history.push(message.clone());
        if self.outbox.send(PanelEvent::Message(message)).is_err() {
            debug!("Panel closed; dropping message {}", id);
        }
        id
    }

    /// Candidate files for the attach picker.
    pub async fn search_files(&self, query: &str) -> io::Result<Vec<PathBuf>> {
        search_files(self.generator.file_system().as_ref(), query).await
    }

    /// Read `path` and add it to the context buffer.
    pub async fn attach_file(&mut self, path: &Path) -> Result<(), AgentError> {
        let fs = Arc::clone(self.generator.file_system());
        match fs.read_text(path).await {
            Ok(content) => {
                self.context.append(path, &content);
                info!("Attached {}", path.display());
                self.post(
                    MessageKind::Admin,
                    format!("Added the file -> {}", display_path(path)),
                );
                Ok(())
            }
            Err(e) => {
                let err = AgentError::io(Stage::Attaching, path, e);
                self.post(MessageKind::Admin, err.to_string());
                Err(err)
            }
        }
    }

    /// Generate a test for `prompt` using the attached context.
    ///
    /// Progress frames and streamed fragments are posted while the completion
    /// runs. The outcome is posted as a `test` message or an `admin` error.
    pub async fn send_message(&mut self, prompt: &str) -> Result<String, AgentError> {
        let request = self.context.request(prompt);
        if request.prompt.is_some() {
            self.post(MessageKind::User, prompt);
        }

        let progress_tx = self.outbox.clone();
        let progress = Arc::new(move |text: &str| {
            let _ = progress_tx.send(PanelEvent::Message(PanelMessage::new(
                MessageKind::UpdateMessage,
                text,
            )));
        });
        let chunk_tx = self.outbox.clone();
        let on_chunk = move |chunk: &str| {
            let _ = chunk_tx.send(PanelEvent::Chunk(chunk.to_string()));
        };

        let result = self.generator.generate(&request, progress, on_chunk).await;

        match result {
            Ok(artifact) => {
                self.post(MessageKind::Test, artifact.clone());
                Ok(artifact)
            }
            Err(e) => {
                self.post(MessageKind::Admin, format!("Error: {}", e));
                Err(e)
            }
        }
    }

    /// Record feedback on a message. Returns false if the message is unknown
    /// or does not take feedback.
    pub fn record_feedback(&self, message_id: Uuid, feedback: Feedback) -> bool {
        let Some(message) = self.history.iter().find(|m| m.id == message_id) else {
            debug!("Feedback for unknown message {}", message_id);
            return false;
        };
        if !message.accepts_feedback() {
            return false;
        }

        let event = FeedbackEvent {
            message_id,
            kind: message.kind,
            feedback,
        };
        debug!("Feedback {:?} on message {}", feedback, message_id);
        if let Some(hook) = &self.feedback_hook {
            hook(&event);
        }
        true
    }
}
