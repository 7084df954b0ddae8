//! Hand observation types and the perception trait.
//!
//! The perception side (camera + hand detector) is an external
//! collaborator. All the core needs from it is, per frame, the raised
//! fingers of up to [`MAX_HANDS`] hands. This module defines:
//! - `Fingers` - Per-finger "up" flags as reported by a detector
//! - `HandObservation` / `FrameObservation` - One hand / one frame
//! - `HandSource` trait - Anything that yields frame observations
//! - `CaptureError` - Why a frame could not be obtained

use crate::consts::{MAX_FINGERS, MAX_HANDS};
use bitflags::bitflags;
use std::fmt;
use thiserror::Error;

bitflags! {
    /// Raised fingers of one hand, thumb first.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Fingers: u8 {
        /// Thumb extended.
        const THUMB  = 0b0000_0001;
        /// Index finger extended.
        const INDEX  = 0b0000_0010;
        /// Middle finger extended.
        const MIDDLE = 0b0000_0100;
        /// Ring finger extended.
        const RING   = 0b0000_1000;
        /// Pinky extended.
        const PINKY  = 0b0001_0000;
    }
}

impl Fingers {
    /// Number of raised fingers (0–5).
    #[inline]
    pub const fn count(self) -> u8 {
        self.bits().count_ones() as u8
    }

    /// Canonical flags for a bare count: the first `count` fingers, thumb first.
    ///
    /// Counts above five saturate to a full hand.
    pub const fn from_count(count: u8) -> Self {
        let n = if count > MAX_FINGERS { MAX_FINGERS } else { count };
        Self::from_bits_truncate(((1u16 << n) - 1) as u8)
    }

    /// Build from detector-style up flags `[thumb, index, middle, ring, pinky]`.
    pub fn from_up_flags(flags: [bool; 5]) -> Self {
        flags
            .iter()
            .enumerate()
            .filter(|(_, up)| **up)
            .fold(Self::empty(), |acc, (i, _)| {
                acc | Self::from_bits_truncate(1 << i)
            })
    }

    /// Detector-style up flags `[thumb, index, middle, ring, pinky]`.
    pub fn up_flags(self) -> [bool; 5] {
        let mut flags = [false; 5];
        for (i, flag) in flags.iter_mut().enumerate() {
            *flag = self.bits() & (1 << i) != 0;
        }
        flags
    }
}

impl Default for Fingers {
    fn default() -> Self {
        Self::empty()
    }
}

/// Which hand the detector believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    /// Left hand.
    Left,
    /// Right hand.
    Right,
}

/// One detected hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HandObservation {
    /// Raised fingers.
    pub fingers: Fingers,
    /// Handedness, when the detector reports it.
    pub handedness: Option<Handedness>,
}

impl HandObservation {
    /// Observation with the given flags and unknown handedness.
    pub const fn new(fingers: Fingers) -> Self {
        Self {
            fingers,
            handedness: None,
        }
    }

    /// Observation with canonical flags for a bare finger count.
    pub const fn with_count(count: u8) -> Self {
        Self::new(Fingers::from_count(count))
    }

    /// Number of raised fingers.
    #[inline]
    pub const fn finger_count(&self) -> u8 {
        self.fingers.count()
    }
}

/// Everything the detector reported for a single frame, in detection order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrameObservation {
    hands: heapless::Vec<HandObservation, MAX_HANDS>,
}

impl FrameObservation {
    /// Frame with no hands.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Frame built from bare finger counts; entries past [`MAX_HANDS`] are dropped.
    pub fn from_counts(counts: &[u8]) -> Self {
        let mut frame = Self::empty();
        for &count in counts.iter().take(MAX_HANDS) {
            let _ = frame.push(HandObservation::with_count(count));
        }
        frame
    }

    /// Append a hand. Returns the hand back if the frame is already full.
    pub fn push(&mut self, hand: HandObservation) -> Result<(), HandObservation> {
        self.hands.push(hand)
    }

    /// First detected hand, if any. This is the one that drives the servo.
    pub fn primary(&self) -> Option<&HandObservation> {
        self.hands.first()
    }

    /// Second detected hand, if any.
    pub fn secondary(&self) -> Option<&HandObservation> {
        self.hands.get(1)
    }

    /// All hands in detection order.
    pub fn hands(&self) -> &[HandObservation] {
        &self.hands
    }

    /// Number of detected hands.
    pub fn len(&self) -> usize {
        self.hands.len()
    }

    /// True when no hand was detected.
    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

impl fmt::Display for FrameObservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("no hands");
        }
        let counts: Vec<String> = self
            .hands
            .iter()
            .map(|h| h.finger_count().to_string())
            .collect();
        write!(f, "fingers [{}]", counts.join(", "))
    }
}

/// Frame capture failure.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Underlying device or stream failed.
    #[error("Capture I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A frame was obtained but could not be interpreted.
    #[error("Malformed frame at line {line}: {reason}")]
    Malformed {
        /// 1-based line (or frame) number.
        line: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Source-specific failure.
    #[error("Capture device error: {0}")]
    Device(String),
}

/// Anything that can deliver per-frame hand observations.
///
/// Implementations wrap a camera + detector, a recorded session, or a
/// synthetic script. The core never sees frames, only observations.
pub trait HandSource {
    /// Human-readable source identifier for logs.
    fn name(&self) -> &str;

    /// Block until the next frame is observed.
    ///
    /// Returns `Ok(None)` when the stream has ended or the user asked to quit.
    fn next_frame(&mut self) -> Result<Option<FrameObservation>, CaptureError>;
}
