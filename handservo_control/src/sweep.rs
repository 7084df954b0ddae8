//! Sweep controller.
//!
//! Owns the sweep state and, while sweeping, one background worker that
//! walks the commanded position back and forth between the configured
//! extremes.
//!
//! ```text
//!            start()                     stop() / shutdown()
//!   Idle ───────────────► Sweeping ───────────────────────► Idle
//!    ▲                      │  worker: min → max → min ...    │
//!    └── center + settle ◄──┴──── request stop + join ◄───────┘
//! ```
//!
//! Only `start()`/`stop()`/`shutdown()` change [`SweepState`]. The worker is
//! the only writer of the position while it runs; `stop()` joins it before
//! writing center, so the centering write is always the last one.

use crate::cancel::StopToken;
use crate::error::ControlError;
use handservo_common::config::SweepConfig;
use handservo_common::driver::DriverError;
use handservo_common::servo::{CommandedPosition, SweepState};
use handservo_hal::Actuator;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

// ─── Pattern ────────────────────────────────────────────────────────

/// One step of the oscillation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepStep {
    /// Position to command.
    pub position: CommandedPosition,
    /// True when this step reaches an extreme and ends a leg.
    pub completes_leg: bool,
}

/// Endless min → max → min position sequence.
///
/// Positions are derived from integer step indices, so both extremes and
/// (for a symmetric range) the center are hit exactly. Each leg is
/// strictly monotonic: a turnaround point is emitted once.
#[derive(Debug, Clone)]
pub struct SweepPattern {
    min: f64,
    max: f64,
    steps: u32,
    index: u32,
    rising: bool,
}

impl SweepPattern {
    /// Pattern for a validated sweep configuration.
    pub fn new(config: &SweepConfig) -> Self {
        Self {
            min: config.min_position,
            max: config.max_position,
            steps: config.steps_per_leg().max(1),
            index: 0,
            rising: true,
        }
    }

    fn position_at(&self, index: u32) -> CommandedPosition {
        if index == self.steps {
            return CommandedPosition::new(self.max);
        }
        let fraction = index as f64 / self.steps as f64;
        CommandedPosition::new(self.min + (self.max - self.min) * fraction)
    }
}

impl Iterator for SweepPattern {
    type Item = SweepStep;

    fn next(&mut self) -> Option<SweepStep> {
        let position = self.position_at(self.index);
        let completes_leg = if self.rising {
            self.index == self.steps
        } else {
            self.index == 0
        };

        if completes_leg {
            self.rising = !self.rising;
        }
        self.index = if self.rising {
            self.index + 1
        } else {
            self.index - 1
        };

        Some(SweepStep {
            position,
            completes_leg,
        })
    }
}

// ─── Worker ─────────────────────────────────────────────────────────

/// What a worker did before it exited.
#[derive(Debug, Default)]
pub struct SweepReport {
    /// Positions written.
    pub steps: u64,
    /// Legs completed.
    pub legs: u64,
    /// Driver error that ended the worker early, if any.
    pub fault: Option<DriverError>,
}

struct SweepWorker {
    token: StopToken,
    handle: JoinHandle<SweepReport>,
}

fn run_sweep(
    pattern: SweepPattern,
    actuator: Actuator,
    token: StopToken,
    step_delay: Duration,
) -> SweepReport {
    let mut report = SweepReport::default();

    for step in pattern {
        if token.is_stop_requested() {
            break;
        }
        if let Err(e) = actuator.command(step.position) {
            error!("Sweep step to {} failed: {e}", step.position);
            report.fault = Some(e);
            break;
        }
        report.steps += 1;
        if step.completes_leg {
            report.legs += 1;
            debug!("Sweep leg {} complete at {}", report.legs, step.position);
        }
        if token.wait_timeout(step_delay) {
            break;
        }
    }

    report
}

// ─── Controller ─────────────────────────────────────────────────────

/// Outcome of a `start()` or `stop()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Idle → Sweeping.
    Started,
    /// Sweeping → Idle.
    Stopped,
    /// Already in the requested state.
    Unchanged,
}

/// Sweep/stop state machine driving an [`Actuator`].
pub struct SweepController {
    config: SweepConfig,
    actuator: Actuator,
    state: SweepState,
    worker: Option<SweepWorker>,
    activations: u64,
    shut_down: bool,
}

impl SweepController {
    /// Create an idle controller. The actuator is not written until the
    /// first `start()`, `stop()` or `shutdown()`.
    pub fn new(config: SweepConfig, actuator: Actuator) -> Self {
        info!(
            "Sweep controller: [{}, {}] step {} every {} ms",
            config.min_position, config.max_position, config.step, config.step_delay_ms
        );
        Self {
            config,
            actuator,
            state: SweepState::Idle,
            worker: None,
            activations: 0,
            shut_down: false,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> SweepState {
        self.state
    }

    /// Last commanded position.
    pub fn position(&self) -> CommandedPosition {
        self.actuator.position()
    }

    /// Number of Idle → Sweeping transitions so far.
    pub fn activations(&self) -> u64 {
        self.activations
    }

    /// Sweep parameters.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// The actuator this controller drives.
    pub fn actuator(&self) -> &Actuator {
        &self.actuator
    }

    /// True once `shutdown()` has run.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Begin sweeping. No-op while already sweeping.
    ///
    /// # Errors
    /// `ControlError::ShutDown` after shutdown, `ControlError::Spawn` if the
    /// worker thread cannot be created (state stays `Idle`).
    pub fn start(&mut self) -> Result<Transition, ControlError> {
        if self.shut_down {
            return Err(ControlError::ShutDown);
        }
        if self.state == SweepState::Sweeping {
            return Ok(Transition::Unchanged);
        }

        let token = StopToken::new();
        let worker_token = token.clone();
        let actuator = self.actuator.clone();
        let pattern = SweepPattern::new(&self.config);
        let step_delay = self.config.step_delay();

        let handle = thread::Builder::new()
            .name("sweep-worker".to_string())
            .spawn(move || run_sweep(pattern, actuator, worker_token, step_delay))
            .map_err(ControlError::Spawn)?;

        self.worker = Some(SweepWorker { token, handle });
        self.state = SweepState::Sweeping;
        self.activations += 1;
        info!("Servo sweep started (activation #{})", self.activations);
        Ok(Transition::Started)
    }

    /// Stop sweeping and return to center. No-op while idle.
    ///
    /// Blocks until the worker has exited (at most one step delay) and then
    /// for `center_settle` so the servo can reach center.
    ///
    /// # Errors
    /// Driver failure on the centering write. The state is `Idle` regardless.
    pub fn stop(&mut self) -> Result<Transition, ControlError> {
        if self.shut_down {
            return Err(ControlError::ShutDown);
        }
        if self.state == SweepState::Idle {
            return Ok(Transition::Unchanged);
        }

        let halted = self.halt_worker();
        self.state = SweepState::Idle;
        let centered = self.actuator.command(CommandedPosition::CENTER);
        thread::sleep(self.config.center_settle());
        centered?;
        halted?;

        info!("Servo sweep stopped, centered");
        Ok(Transition::Stopped)
    }

    /// Unconditionally stop, center and release the actuator.
    ///
    /// Safe to call in any state and more than once; only the first call
    /// touches the hardware.
    pub fn shutdown(&mut self) -> Result<(), ControlError> {
        if self.shut_down {
            return Ok(());
        }
        self.shut_down = true;

        let halted = self.halt_worker();
        self.state = SweepState::Idle;

        let centered = self.actuator.command(CommandedPosition::CENTER);
        if let Err(e) = &centered {
            warn!("Failed to center servo on shutdown: {e}");
        }
        thread::sleep(self.config.shutdown_settle());
        let released = self.actuator.release();

        centered?;
        released?;
        halted?;
        info!("Cleanup complete - servo centered and released");
        Ok(())
    }

    /// Signal the worker, wait for it and log what it did.
    fn halt_worker(&mut self) -> Result<(), ControlError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        worker.token.request_stop();
        match worker.handle.join() {
            Ok(report) => {
                debug!(
                    "Sweep worker exited after {} steps, {} legs",
                    report.steps, report.legs
                );
                if let Some(fault) = report.fault {
                    warn!("Sweep worker had stopped early: {fault}");
                }
                Ok(())
            }
            Err(_) => {
                error!("Sweep worker panicked");
                Err(ControlError::WorkerPanicked)
            }
        }
    }
}

impl Drop for SweepController {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("Sweep controller shutdown on drop failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handservo_common::config::ServoConfig;
    use handservo_hal::{PositionLog, SimulationDriver};

    fn fast_config() -> SweepConfig {
        SweepConfig {
            step_delay_ms: 1,
            center_settle_ms: 1,
            shutdown_settle_ms: 1,
            ..SweepConfig::default()
        }
    }

    fn controller(config: SweepConfig) -> (SweepController, PositionLog) {
        let log = PositionLog::new();
        let actuator = Actuator::new(
            Box::new(SimulationDriver::with_log(log.clone())),
            &ServoConfig::default(),
        )
        .unwrap();
        (SweepController::new(config, actuator), log)
    }

    fn values(pattern: SweepPattern, n: usize) -> Vec<f64> {
        pattern.take(n).map(|s| s.position.value()).collect()
    }

    #[test]
    fn pattern_turns_at_extremes_once() {
        let config = SweepConfig {
            min_position: -1.0,
            max_position: 1.0,
            step: 0.5,
            ..SweepConfig::default()
        };
        assert_eq!(
            values(SweepPattern::new(&config), 11),
            vec![-1.0, -0.5, 0.0, 0.5, 1.0, 0.5, 0.0, -0.5, -1.0, -0.5, 0.0]
        );
    }

    #[test]
    fn pattern_marks_leg_ends() {
        let config = SweepConfig {
            step: 1.0,
            ..SweepConfig::default()
        };
        let legs: Vec<bool> = SweepPattern::new(&config)
            .take(5)
            .map(|s| s.completes_leg)
            .collect();
        // -1, 0, 1, 0, -1
        assert_eq!(legs, vec![false, false, true, false, true]);
    }

    #[test]
    fn default_pattern_has_41_points_per_leg() {
        let steps: Vec<f64> = values(SweepPattern::new(&SweepConfig::default()), 81);
        assert_eq!(steps[0], -1.0);
        assert_eq!(steps[20], 0.0);
        assert_eq!(steps[40], 1.0);
        assert_eq!(steps[80], -1.0);
        for pair in steps[..41].windows(2) {
            assert!((pair[1] - pair[0] - 0.05).abs() < 1e-9);
        }
        for pair in steps[40..].windows(2) {
            assert!((pair[0] - pair[1] - 0.05).abs() < 1e-9);
        }
    }

    #[test]
    fn new_controller_is_idle_and_silent() {
        let (ctl, log) = controller(fast_config());
        assert_eq!(ctl.state(), SweepState::Idle);
        assert!(ctl.position().is_center());
        assert!(log.is_empty());
    }

    #[test]
    fn stop_before_start_is_noop() {
        let (mut ctl, log) = controller(fast_config());
        assert_eq!(ctl.stop().unwrap(), Transition::Unchanged);
        assert_eq!(ctl.state(), SweepState::Idle);
        assert!(log.is_empty());
    }

    #[test]
    fn start_twice_spawns_one_worker() {
        let (mut ctl, _log) = controller(fast_config());
        assert_eq!(ctl.start().unwrap(), Transition::Started);
        assert_eq!(ctl.start().unwrap(), Transition::Unchanged);
        assert_eq!(ctl.activations(), 1);
        assert_eq!(ctl.state(), SweepState::Sweeping);
        assert_eq!(ctl.stop().unwrap(), Transition::Stopped);
        assert_eq!(ctl.state(), SweepState::Idle);
    }

    #[test]
    fn start_after_shutdown_rejected() {
        let (mut ctl, _log) = controller(fast_config());
        ctl.shutdown().unwrap();
        assert!(matches!(ctl.start(), Err(ControlError::ShutDown)));
    }

    #[test]
    fn shutdown_from_idle_centers_and_releases() {
        let (mut ctl, log) = controller(fast_config());
        ctl.shutdown().unwrap();
        ctl.shutdown().unwrap();
        assert_eq!(log.values(), vec![0.0]);
        assert!(ctl.actuator().is_released());
        assert!(ctl.is_shut_down());
    }

    #[test]
    fn drop_centers_running_sweep() {
        let log = {
            let (mut ctl, log) = controller(fast_config());
            ctl.start().unwrap();
            thread::sleep(Duration::from_millis(10));
            log
        };
        assert_eq!(log.last().unwrap().position, CommandedPosition::CENTER);
    }
}
