//! Per-frame decision: finger count on the first hand → start or stop.

use crate::error::ControlError;
use crate::sweep::{SweepController, Transition};
use handservo_common::config::DecisionConfig;
use handservo_common::hand::FrameObservation;
use handservo_common::servo::SweepState;
use std::fmt;
use tracing::debug;

/// What the decision loop wants for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepRequest {
    /// Ensure the controller is sweeping.
    Start,
    /// Ensure the controller is stopped.
    Stop,
}

/// Status after one frame has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Finger count of the first hand, if one was seen.
    pub primary_fingers: Option<u8>,
    /// Finger count of the second hand, if one was seen.
    pub secondary_fingers: Option<u8>,
    /// Request derived from the frame.
    pub request: SweepRequest,
    /// What the controller did with it.
    pub transition: Transition,
    /// Controller state afterwards.
    pub state: SweepState,
    /// Last commanded angle in degrees.
    pub angle_deg: f64,
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.primary_fingers {
            Some(count) => write!(f, "Fingers: {count} | Servo: {}", self.state)?,
            None => write!(f, "No hands detected | Servo: {}", self.state)?,
        }
        write!(f, " | Angle: {:.0}°", self.angle_deg)?;
        if let Some(count) = self.secondary_fingers {
            write!(f, " | Hand 2: {count} fingers")?;
        }
        Ok(())
    }
}

/// Maps frames to sweep requests.
///
/// Only the primary hand is considered. A frame without hands always stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionLoop {
    trigger_fingers: u8,
}

impl DecisionLoop {
    /// Decision loop with the configured trigger count.
    pub fn new(config: &DecisionConfig) -> Self {
        Self::with_trigger(config.trigger_fingers)
    }

    /// Decision loop with an explicit trigger count.
    pub const fn with_trigger(trigger_fingers: u8) -> Self {
        Self { trigger_fingers }
    }

    /// Finger count that activates the sweep.
    pub const fn trigger_fingers(&self) -> u8 {
        self.trigger_fingers
    }

    /// Request for a frame.
    pub fn decide(&self, frame: &FrameObservation) -> SweepRequest {
        match frame.primary() {
            Some(hand) if hand.finger_count() == self.trigger_fingers => SweepRequest::Start,
            _ => SweepRequest::Stop,
        }
    }

    /// Decide and drive the controller accordingly.
    ///
    /// # Errors
    /// Whatever the controller reports for `start()` or `stop()`.
    pub fn apply(
        &self,
        frame: &FrameObservation,
        controller: &mut SweepController,
    ) -> Result<FrameReport, ControlError> {
        let request = self.decide(frame);
        let transition = match request {
            SweepRequest::Start => controller.start()?,
            SweepRequest::Stop => controller.stop()?,
        };

        let report = FrameReport {
            primary_fingers: frame.primary().map(|h| h.finger_count()),
            secondary_fingers: frame.secondary().map(|h| h.finger_count()),
            request,
            transition,
            state: controller.state(),
            angle_deg: controller.position().to_degrees(),
        };
        debug!("{report}");
        Ok(report)
    }
}

impl Default for DecisionLoop {
    fn default() -> Self {
        Self::new(&DecisionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handservo_common::hand::{Fingers, HandObservation};

    #[test]
    fn trigger_on_primary_only() {
        let decision = DecisionLoop::default();
        assert_eq!(decision.trigger_fingers(), 3);
        assert_eq!(decision.decide(&FrameObservation::from_counts(&[3])), SweepRequest::Start);
        assert_eq!(decision.decide(&FrameObservation::from_counts(&[3, 0])), SweepRequest::Start);
        assert_eq!(decision.decide(&FrameObservation::from_counts(&[2, 3])), SweepRequest::Stop);
    }

    #[test]
    fn empty_frame_stops() {
        let decision = DecisionLoop::default();
        assert_eq!(decision.decide(&FrameObservation::empty()), SweepRequest::Stop);
    }

    #[test]
    fn every_other_count_stops() {
        let decision = DecisionLoop::default();
        for count in [0, 1, 2, 4, 5] {
            let frame = FrameObservation::from_counts(&[count]);
            assert_eq!(decision.decide(&frame), SweepRequest::Stop, "count {count}");
        }
    }

    #[test]
    fn flags_count_not_pattern() {
        let decision = DecisionLoop::with_trigger(3);
        let mut frame = FrameObservation::empty();
        let fingers = Fingers::from_up_flags([false, true, true, false, true]);
        frame.push(HandObservation::new(fingers)).unwrap();
        assert_eq!(decision.decide(&frame), SweepRequest::Start);
    }

    #[test]
    fn custom_trigger() {
        let decision = DecisionLoop::new(&DecisionConfig { trigger_fingers: 5 });
        assert_eq!(decision.decide(&FrameObservation::from_counts(&[5])), SweepRequest::Start);
        assert_eq!(decision.decide(&FrameObservation::from_counts(&[3])), SweepRequest::Stop);
    }

    #[test]
    fn report_lines() {
        let report = FrameReport {
            primary_fingers: Some(3),
            secondary_fingers: Some(1),
            request: SweepRequest::Start,
            transition: Transition::Started,
            state: SweepState::Sweeping,
            angle_deg: 45.0,
        };
        assert_eq!(
            report.to_string(),
            "Fingers: 3 | Servo: SWEEPING | Angle: 45° | Hand 2: 1 fingers"
        );

        let idle = FrameReport {
            primary_fingers: None,
            secondary_fingers: None,
            request: SweepRequest::Stop,
            transition: Transition::Unchanged,
            state: SweepState::Idle,
            angle_deg: 90.0,
        };
        assert_eq!(idle.to_string(), "No hands detected | Servo: STOPPED | Angle: 90°");
    }
}
