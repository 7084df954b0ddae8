//! Prelude module for common re-exports.
//!
//! ```rust
//! use handservo_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    AppConfig, ConfigError, ConfigLoader, ConfigOverrides, DecisionConfig, LogLevel, ServoConfig,
    SharedConfig, SweepConfig,
};

// ─── Constants ──────────────────────────────────────────────────────
pub use crate::consts::{DEFAULT_TRIGGER_FINGERS, MAX_FINGERS, MAX_HANDS};

// ─── Servo ──────────────────────────────────────────────────────────
pub use crate::driver::{DriverError, ServoDriver};
pub use crate::servo::{CommandedPosition, SweepState};

// ─── Perception ─────────────────────────────────────────────────────
pub use crate::hand::{
    CaptureError, FrameObservation, Fingers, HandObservation, HandSource, Handedness,
};
