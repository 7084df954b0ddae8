//! Frame sequences through the decision loop into a live controller.

use handservo_common::config::{DecisionConfig, ServoConfig, SweepConfig};
use handservo_common::hand::FrameObservation;
use handservo_common::servo::SweepState;
use handservo_control::{DecisionLoop, SweepController, SweepRequest, Transition};
use handservo_hal::{Actuator, PositionLog, SimulationDriver};

fn controller() -> (SweepController, PositionLog) {
    let log = PositionLog::new();
    let actuator = Actuator::new(
        Box::new(SimulationDriver::with_log(log.clone())),
        &ServoConfig::default(),
    )
    .unwrap();
    let config = SweepConfig {
        step_delay_ms: 1,
        center_settle_ms: 1,
        shutdown_settle_ms: 1,
        ..SweepConfig::default()
    };
    (SweepController::new(config, actuator), log)
}

fn states_for(decision: &DecisionLoop, frames: &[FrameObservation]) -> Vec<SweepState> {
    let (mut ctl, _log) = controller();
    frames
        .iter()
        .map(|frame| decision.apply(frame, &mut ctl).unwrap().state)
        .collect()
}

#[test]
fn trigger_start_stop_restart() {
    let decision = DecisionLoop::default();
    let (mut ctl, log) = controller();
    let expected = [
        SweepState::Idle,
        SweepState::Sweeping,
        SweepState::Sweeping,
        SweepState::Idle,
        SweepState::Sweeping,
    ];

    for (&count, &state) in [0, 3, 3, 2, 3].iter().zip(expected.iter()) {
        let report = decision
            .apply(&FrameObservation::from_counts(&[count]), &mut ctl)
            .unwrap();
        assert_eq!(report.state, state, "after {count} fingers");

        if state == SweepState::Idle {
            assert!(ctl.position().is_center(), "after {count} fingers");
            assert_eq!(report.angle_deg, 90.0);
        }
        if count == 2 {
            assert_eq!(report.transition, Transition::Stopped);
            assert_eq!(log.last().unwrap().position.value(), 0.0);
        }
    }
}

#[test]
fn losing_the_hand_stops() {
    let frames = [
        FrameObservation::from_counts(&[3]),
        FrameObservation::empty(),
        FrameObservation::empty(),
    ];
    assert_eq!(
        states_for(&DecisionLoop::default(), &frames),
        vec![SweepState::Sweeping, SweepState::Idle, SweepState::Idle]
    );
}

#[test]
fn second_hand_never_triggers() {
    let frames = [
        FrameObservation::from_counts(&[1, 3]),
        FrameObservation::from_counts(&[3, 1]),
        FrameObservation::from_counts(&[5, 3]),
    ];
    assert_eq!(
        states_for(&DecisionLoop::default(), &frames),
        vec![SweepState::Idle, SweepState::Sweeping, SweepState::Idle]
    );
}

#[test]
fn reports_track_transitions_and_angle() {
    let decision = DecisionLoop::new(&DecisionConfig { trigger_fingers: 2 });
    let (mut ctl, log) = controller();

    let idle = decision
        .apply(&FrameObservation::from_counts(&[4, 2]), &mut ctl)
        .unwrap();
    assert_eq!(idle.request, SweepRequest::Stop);
    assert_eq!(idle.transition, Transition::Unchanged);
    assert_eq!(idle.angle_deg, 90.0);
    assert_eq!(idle.secondary_fingers, Some(2));
    assert!(log.is_empty());

    let started = decision
        .apply(&FrameObservation::from_counts(&[2]), &mut ctl)
        .unwrap();
    assert_eq!(started.transition, Transition::Started);
    assert!(started.to_string().starts_with("Fingers: 2 | Servo: SWEEPING"));

    let stopped = decision
        .apply(&FrameObservation::empty(), &mut ctl)
        .unwrap();
    assert_eq!(stopped.transition, Transition::Stopped);
    assert_eq!(stopped.angle_deg, 90.0);
    assert_eq!(
        stopped.to_string(),
        "No hands detected | Servo: STOPPED | Angle: 90°"
    );
    assert_eq!(log.last().unwrap().position.value(), 0.0);
}
