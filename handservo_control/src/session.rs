//! Session loop: frames in, sweep decisions out.
//!
//! Runs until the feed finishes, the source fails, or the running flag is
//! cleared (Ctrl-C). Whatever ends it, the controller is shut down before
//! `run()` returns, leaving the servo centered and released.

use crate::decision::DecisionLoop;
use crate::error::SessionError;
use crate::perception::{FeedEvent, FrameFeed};
use crate::sweep::{SweepController, Transition};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{error, info};

/// How often the loop re-checks the running flag while no frame arrives.
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Source ran out of frames or quit was requested.
    SourceFinished,
    /// Running flag was cleared.
    Interrupted,
}

/// Totals for a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Frames processed.
    pub frames: u64,
    /// Frames in which at least one hand was seen.
    pub frames_with_hands: u64,
    /// Times the sweep was started.
    pub activations: u64,
    /// Why the session ended.
    pub end: SessionEnd,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames ({} with hands), {} sweep activations, {:?}",
            self.frames, self.frames_with_hands, self.activations, self.end
        )
    }
}

/// Decision loop and controller bound to a running flag.
pub struct Session {
    decision: DecisionLoop,
    controller: SweepController,
    running: Arc<AtomicBool>,
    poll_interval: Duration,
}

impl Session {
    /// Create a session. The running flag starts set.
    pub fn new(decision: DecisionLoop, controller: SweepController) -> Self {
        Self {
            decision,
            controller,
            running: Arc::new(AtomicBool::new(true)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the running-flag poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// The controller driven by this session.
    pub fn controller(&self) -> &SweepController {
        &self.controller
    }

    /// Process frames from `feed` until it ends or the flag is cleared.
    ///
    /// # Errors
    /// `SessionError::Capture` if the source fails, `SessionError::Control`
    /// if the controller does. The controller is shut down in every case.
    pub fn run(&mut self, feed: &FrameFeed) -> Result<SessionSummary, SessionError> {
        info!("Session started on source '{}'", feed.name());
        let outcome = self.process(feed);

        let shutdown = self.controller.shutdown();
        match outcome {
            Ok(summary) => {
                shutdown?;
                info!("Session finished: {summary}");
                Ok(summary)
            }
            Err(e) => {
                if let Err(shutdown_err) = shutdown {
                    error!("Shutdown after session failure also failed: {shutdown_err}");
                }
                Err(e)
            }
        }
    }

    fn process(&mut self, feed: &FrameFeed) -> Result<SessionSummary, SessionError> {
        let mut frames = 0u64;
        let mut frames_with_hands = 0u64;
        let mut end = SessionEnd::Interrupted;

        while self.running.load(Ordering::SeqCst) {
            let Some(event) = feed.recv_timeout(self.poll_interval) else {
                continue;
            };
            match event {
                FeedEvent::Frame(frame) => {
                    frames += 1;
                    if !frame.is_empty() {
                        frames_with_hands += 1;
                    }
                    let report = self.decision.apply(&frame, &mut self.controller)?;
                    if report.transition != Transition::Unchanged {
                        info!("{report}");
                    }
                }
                FeedEvent::Failed(e) => {
                    error!("Failed to read from camera: {e}");
                    return Err(e.into());
                }
                FeedEvent::Finished => {
                    end = SessionEnd::SourceFinished;
                    break;
                }
            }
        }

        if end == SessionEnd::Interrupted {
            info!("Session interrupted");
        }
        Ok(SessionSummary {
            frames,
            frames_with_hands,
            activations: self.controller.activations(),
            end,
        })
    }
}
