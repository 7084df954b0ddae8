//! Sweep controller timing and ordering tests.
//!
//! Uses the simulation driver's position log with millisecond step delays.

use handservo_common::config::{ServoConfig, SweepConfig};
use handservo_common::driver::{DriverError, ServoDriver};
use handservo_common::servo::{CommandedPosition, SweepState};
use handservo_control::{SweepController, Transition};
use handservo_hal::{Actuator, PositionLog, SimulationDriver};
use std::thread;
use std::time::{Duration, Instant};

fn sweep_config(step_delay_ms: u64) -> SweepConfig {
    SweepConfig {
        step_delay_ms,
        center_settle_ms: 1,
        shutdown_settle_ms: 1,
        ..SweepConfig::default()
    }
}

fn simulated(config: SweepConfig) -> (SweepController, PositionLog) {
    let log = PositionLog::new();
    let actuator = Actuator::new(
        Box::new(SimulationDriver::with_log(log.clone())),
        &ServoConfig::default(),
    )
    .unwrap();
    (SweepController::new(config, actuator), log)
}

#[test]
fn sweep_moves_in_fixed_increments_then_centers() {
    let (mut ctl, log) = simulated(sweep_config(1));

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(60));
    assert_eq!(ctl.stop().unwrap(), Transition::Stopped);

    let values = log.values();
    assert!(values.len() > 3, "worker wrote only {} positions", values.len());
    assert_eq!(values[0], -1.0);
    assert_eq!(*values.last().unwrap(), 0.0);

    let sweep = &values[..values.len() - 1];
    for pair in sweep.windows(2) {
        let delta = (pair[1] - pair[0]).abs();
        assert!((delta - 0.05).abs() < 1e-9, "step {pair:?}");
    }
    assert!(sweep.iter().all(|v| (-1.0..=1.0).contains(v)));
}

#[test]
fn worker_holds_step_cadence() {
    let step_delay = Duration::from_millis(20);
    let (mut ctl, log) = simulated(sweep_config(20));

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(300));
    ctl.stop().unwrap();

    let samples = log.snapshot();
    // Last sample is the centering write, which may land early.
    let sweep = &samples[..samples.len() - 1];
    assert!(sweep.len() >= 5, "only {} sweep writes", sweep.len());

    for pair in sweep.windows(2) {
        let gap = pair[1].at.duration_since(pair[0].at);
        assert!(gap >= step_delay, "writes {gap:?} apart");
    }
    assert!(samples[samples.len() - 1].at >= sweep[sweep.len() - 1].at);
}

#[test]
fn no_writes_after_stop_returns() {
    let (mut ctl, log) = simulated(sweep_config(1));

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(20));
    ctl.stop().unwrap();

    let after_stop = log.len();
    thread::sleep(Duration::from_millis(30));
    assert_eq!(log.len(), after_stop);
    assert_eq!(ctl.state(), SweepState::Idle);
    assert!(ctl.position().is_center());
}

#[test]
fn stop_interrupts_long_step_delay() {
    let (mut ctl, log) = simulated(sweep_config(2_000));

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(20));

    let begin = Instant::now();
    ctl.stop().unwrap();
    assert!(begin.elapsed() < Duration::from_millis(1_000));
    assert_eq!(log.values(), vec![-1.0, 0.0]);
}

#[test]
fn restart_begins_a_fresh_sweep_from_min() {
    let (mut ctl, log) = simulated(sweep_config(1));

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(15));
    ctl.stop().unwrap();
    let first_run = log.len();

    assert_eq!(ctl.start().unwrap(), Transition::Started);
    thread::sleep(Duration::from_millis(15));
    ctl.stop().unwrap();

    assert_eq!(ctl.activations(), 2);
    assert_eq!(log.values()[first_run], -1.0);
}

#[test]
fn repeated_start_keeps_single_writer() {
    let (mut ctl, log) = simulated(sweep_config(1));

    for _ in 0..10 {
        ctl.start().unwrap();
    }
    thread::sleep(Duration::from_millis(30));
    ctl.stop().unwrap();

    assert_eq!(ctl.activations(), 1);
    // Two interleaved workers would break the fixed-increment pattern.
    let values = log.values();
    for pair in values[..values.len() - 1].windows(2) {
        assert!(((pair[1] - pair[0]).abs() - 0.05).abs() < 1e-9);
    }
}

#[test]
fn shutdown_while_sweeping_centers_and_releases() {
    let (mut ctl, log) = simulated(sweep_config(1));

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(10));
    ctl.shutdown().unwrap();

    assert_eq!(ctl.state(), SweepState::Idle);
    assert!(ctl.actuator().is_released());
    assert_eq!(log.last().unwrap().position, CommandedPosition::CENTER);
    assert!(matches!(ctl.stop(), Err(handservo_control::ControlError::ShutDown)));
}

/// Rejects any position above center.
struct UpperHalfBroken;

impl ServoDriver for UpperHalfBroken {
    fn name(&self) -> &'static str {
        "upper-half-broken"
    }

    fn version(&self) -> &'static str {
        "0.0.0"
    }

    fn init(&mut self, _config: &ServoConfig) -> Result<(), DriverError> {
        Ok(())
    }

    fn set_position(&mut self, position: CommandedPosition) -> Result<(), DriverError> {
        if position.value() > 0.0 {
            return Err(DriverError::CommunicationError("bus fault".to_string()));
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        Ok(())
    }
}

#[test]
fn worker_fault_ends_worker_but_not_state() {
    let actuator = Actuator::new(
        Box::new(UpperHalfBroken),
        &ServoConfig::default(),
    )
    .unwrap();
    let mut ctl = SweepController::new(sweep_config(1), actuator);

    ctl.start().unwrap();
    thread::sleep(Duration::from_millis(200));

    // -1.00 ..= 0.00 succeeded, +0.05 failed and ended the worker.
    assert_eq!(ctl.actuator().writes(), 21);
    assert_eq!(ctl.state(), SweepState::Sweeping);

    assert_eq!(ctl.stop().unwrap(), Transition::Stopped);
    assert_eq!(ctl.actuator().writes(), 22);
    assert!(ctl.position().is_center());
}
