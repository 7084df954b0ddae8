//! Servo command types.
//!
//! - `CommandedPosition` - Normalized target position sent toward the actuator
//! - `SweepState` - Whether a continuous sweep is active

use crate::consts::{POSITION_CENTER, POSITION_MAX, POSITION_MIN, SERVO_TRAVEL_DEG};
use std::fmt;

/// Normalized servo target in `[-1.0, 1.0]`.
///
/// `-1.0` is one end of the servo's travel (0°), `1.0` the other (180°),
/// `0.0` the center (90°). Values outside the range are clamped on
/// construction; non-finite values collapse to center.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct CommandedPosition(f64);

impl CommandedPosition {
    /// Center of travel.
    pub const CENTER: Self = Self(POSITION_CENTER);
    /// Lower extreme.
    pub const MIN: Self = Self(POSITION_MIN);
    /// Upper extreme.
    pub const MAX: Self = Self(POSITION_MAX);

    /// Create a position, clamping into the valid range.
    pub fn new(value: f64) -> Self {
        if !value.is_finite() {
            return Self::CENTER;
        }
        Self(value.clamp(POSITION_MIN, POSITION_MAX))
    }

    /// Raw normalized value.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// Equivalent servo angle in degrees (0–180).
    pub fn to_degrees(self) -> f64 {
        (self.0 + 1.0) * SERVO_TRAVEL_DEG / 2.0
    }

    /// Position for a servo angle in degrees (clamped to 0–180).
    pub fn from_degrees(degrees: f64) -> Self {
        Self::new(degrees * 2.0 / SERVO_TRAVEL_DEG - 1.0)
    }

    /// True if this is exactly the center value.
    #[inline]
    pub fn is_center(self) -> bool {
        self.0 == POSITION_CENTER
    }
}

impl From<CommandedPosition> for f64 {
    fn from(pos: CommandedPosition) -> Self {
        pos.0
    }
}

impl fmt::Display for CommandedPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+.2}", self.0)
    }
}

/// Sweep controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SweepState {
    /// Actuator held at center, no background task.
    #[default]
    Idle,
    /// Background oscillation task running.
    Sweeping,
}

impl SweepState {
    /// Upper-case label used in status lines.
    pub const fn label(self) -> &'static str {
        match self {
            SweepState::Idle => "STOPPED",
            SweepState::Sweeping => "SWEEPING",
        }
    }

    /// True while sweeping.
    #[inline]
    pub const fn is_sweeping(self) -> bool {
        matches!(self, SweepState::Sweeping)
    }
}

impl fmt::Display for SweepState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
