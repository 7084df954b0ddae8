//! Background frame feed.
//!
//! Sources block (on a camera, a pipe, a terminal). The feed runs one on
//! its own thread and hands frames over a rendezvous-sized channel, so the
//! session loop can wait with a timeout and still notice Ctrl-C. The
//! channel holds a single frame: a slow consumer throttles the source
//! instead of letting frames pile up.

use handservo_common::hand::{CaptureError, FrameObservation, HandSource};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Message from the feed thread.
#[derive(Debug)]
pub enum FeedEvent {
    /// Next observed frame.
    Frame(FrameObservation),
    /// The source failed; no more frames follow.
    Failed(CaptureError),
    /// The source ended or quit was requested.
    Finished,
}

/// Receiving end of a source running on its own thread.
///
/// The thread is detached: a source blocked on input cannot be interrupted,
/// and the process may exit while it is still waiting.
pub struct FrameFeed {
    name: String,
    rx: Receiver<FeedEvent>,
}

impl FrameFeed {
    /// Start `source` on a named background thread.
    ///
    /// # Errors
    /// `CaptureError::Io` if the thread cannot be spawned.
    pub fn spawn<S>(mut source: S) -> Result<Self, CaptureError>
    where
        S: HandSource + Send + 'static,
    {
        let name = source.name().to_string();
        let (tx, rx) = mpsc::sync_channel(1);

        thread::Builder::new()
            .name("frame-feed".to_string())
            .spawn(move || {
                loop {
                    let event = match source.next_frame() {
                        Ok(Some(frame)) => FeedEvent::Frame(frame),
                        Ok(None) => FeedEvent::Finished,
                        Err(e) => {
                            warn!("{}: capture failed: {e}", source.name());
                            FeedEvent::Failed(e)
                        }
                    };
                    let last = !matches!(event, FeedEvent::Frame(_));
                    if tx.send(event).is_err() {
                        debug!("{}: feed receiver dropped", source.name());
                        break;
                    }
                    if last {
                        break;
                    }
                }
            })?;

        Ok(Self { name, rx })
    }

    /// Name of the underlying source.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait up to `timeout` for the next event.
    ///
    /// Returns `None` on timeout. A vanished feed thread reads as
    /// [`FeedEvent::Finished`].
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FeedEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => Some(FeedEvent::Finished),
        }
    }
}

impl std::fmt::Debug for FrameFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameFeed").field("name", &self.name).finish()
    }
}
