//! Test generation pipeline.
//!
//! A request moves through validation, example scanning, prompt building,
//! streaming and extraction. Scanning never fails; validation and streaming
//! failures come back as an [`AgentError`] tagged with the stage.


use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{AgentError, Stage};
use crate::extract::extract_code_block;
use crate::progress::{ProgressSink, ProgressTicker, PROGRESS_INTERVAL};
use crate::prompt::{build_messages, AgentRequest};
use crate::streamer::CompletionStreamer;
use crate::workspace::{read_manifest, ExampleCorpusScanner, FileSystem};

/// Generates a unit test for a request, using the project as context.
///
/// Holds no per-request state, so one generator can serve concurrent calls.
pub struct TestGenerator {
    fs: Arc<dyn FileSystem>,
    streamer: CompletionStreamer,
    progress_interval: Duration,
}

impl TestGenerator {
    pub fn new(fs: Arc<dyn FileSystem>, streamer: CompletionStreamer) -> Self {
        Self {
            fs,
            streamer,
            progress_interval: PROGRESS_INTERVAL,
        }
    }

    pub fn with_progress_interval(mut self, interval: Duration) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn file_system(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Run the pipeline and return the extracted test code.
    ///
    /// `progress` receives periodic "still working" frames while the
    /// completion streams; they stop before this returns. `on_chunk` receives
    /// each streamed fragment in arrival order.
    pub async fn generate<F>(
        &self,
        request: &AgentRequest,
        progress: Arc<dyn ProgressSink>,
        on_chunk: F,
    ) -> Result<String, AgentError>
    where
        F: FnMut(&str) + Send,
    {
        debug!("Stage: {}", Stage::Validating);
        let task = request.validate()?;

        debug!("Stage: {}", Stage::Scanning);
        let examples = ExampleCorpusScanner::new(self.fs.as_ref()).scan().await;
        let manifest = if examples.is_empty() {
            let manifest = read_manifest(self.fs.as_ref()).await;
            if manifest.is_none() {
                debug!("No example tests or manifest found; using default conventions");
            }
            manifest
        } else {
            None
        };

        debug!("Stage: {}", Stage::Building);
        let messages = build_messages(&task, &examples, manifest.as_ref());

        debug!("Stage: {}", Stage::Streaming);
        info!(
            "Generating test for {} with model {}",
            task.test_path.display(),
            self.streamer.config().model
        );
        let output = {
            let _ticker = ProgressTicker::start(progress, self.progress_interval);
            self.streamer.run(&messages, on_chunk).await
        };
        let output = output.map_err(|e| {
            if e.is_backend_failure() {
                warn!("Test generation failed: {}", e);
            } else {
                info!("Test generation produced no output: {}", e);
            }
            AgentError::new(Stage::Streaming, e)
        })?;

        debug!("Stage: {}", Stage::Extracting);
        Ok(extract_code_block(&output))
    }
}
