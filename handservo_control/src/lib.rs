//! # handservo control
//!
//! Turns per-frame finger counts into a servo sweep.
//!
//! ```text
//! HandSource ─► FrameFeed ─► Session ─► DecisionLoop ─► SweepController ─► Actuator
//!  (thread)      (mpsc)                  start / stop     (sweep worker)
//! ```
//!
//! - [`cancel`] - Stop token shared with the sweep worker
//! - [`decision`] - Trigger rule and per-frame report
//! - [`error`] - Controller and session errors
//! - [`perception`] - Line-based source and background frame feed
//! - [`session`] - The frame loop with guaranteed shutdown
//! - [`sweep`] - Sweep pattern and the Idle/Sweeping state machine

pub mod cancel;
pub mod decision;
pub mod error;
pub mod perception;
pub mod session;
pub mod sweep;

pub use decision::{DecisionLoop, FrameReport, SweepRequest};
pub use error::{ControlError, SessionError};
pub use session::{Session, SessionEnd, SessionSummary};
pub use sweep::{SweepController, SweepPattern, Transition};
