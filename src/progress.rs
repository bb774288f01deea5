//! Periodic "still working" notifications while a completion runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Default interval between progress notifications.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(500);

/// Frames cycled through by the progress indicator.
pub const PROGRESS_FRAMES: [&str; 3] = ["Generating test.", "Generating test..", "Generating test..."];

/// Receiver of progress text. Fire-and-forget: nothing is returned and
/// failures are the sink's own business.
pub trait ProgressSink: Send + Sync {
    fn notify(&self, text: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn notify(&self, text: &str) {
        self(text)
    }
}

/// Sink that drops every notification.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn notify(&self, _text: &str) {}
}

/// Guard that posts progress frames until dropped.
///
/// The first frame is posted one full interval after start, so work that
/// finishes immediately produces no notifications at all.
pub struct ProgressTicker {
    task: Option<JoinHandle<()>>,
    stopped: Arc<AtomicBool>,
}

impl ProgressTicker {
    /// Start posting frames to `sink` every `period`. Must be called within a tokio runtime.
    pub fn start(sink: Arc<dyn ProgressSink>, period: Duration) -> Self {
        let period = period.max(Duration::from_millis(1));
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut index: usize = 0;

            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                sink.notify(PROGRESS_FRAMES[index]);
                index += 1;
                index %= PROGRESS_FRAMES.len();
            }
        });

        ProgressTicker {
            task: Some(task),
            stopped,
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
