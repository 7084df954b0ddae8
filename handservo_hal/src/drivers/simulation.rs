//! Simulation driver.
//!
//! Accepts every write, remembers the last position and, when given a
//! [`PositionLog`], records each write with its timestamp. Used when no
//! servo hardware is attached and by the timing tests.

use super::pulse::pulse_width_us;
use handservo_common::config::ServoConfig;
use handservo_common::driver::{DriverDiagnostics, DriverError, ServoDriver};
use handservo_common::servo::CommandedPosition;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace};

/// One recorded write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// When the driver accepted the write.
    pub at: Instant,
    /// Position written.
    pub position: CommandedPosition,
}

/// Shared, append-only record of every position written to a driver.
#[derive(Debug, Clone, Default)]
pub struct PositionLog {
    samples: Arc<Mutex<Vec<PositionSample>>>,
}

impl PositionLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, position: CommandedPosition) {
        self.samples.lock().push(PositionSample {
            at: Instant::now(),
            position,
        });
    }

    /// Copy of all samples so far.
    pub fn snapshot(&self) -> Vec<PositionSample> {
        self.samples.lock().clone()
    }

    /// Raw values of all samples so far.
    pub fn values(&self) -> Vec<f64> {
        self.samples.lock().iter().map(|s| s.position.value()).collect()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Most recent sample.
    pub fn last(&self) -> Option<PositionSample> {
        self.samples.lock().last().copied()
    }
}

/// Simulation driver implementing the `ServoDriver` trait.
pub struct SimulationDriver {
    /// Driver name
    name: &'static str,
    /// Driver version
    version: &'static str,
    /// Config captured at init (for pulse diagnostics)
    config: Option<ServoConfig>,
    /// Last position written
    position: Option<CommandedPosition>,
    /// Accepted writes
    writes: u64,
    /// Optional shared write log
    log: Option<PositionLog>,
}

impl SimulationDriver {
    /// Create a new simulation driver instance.
    pub fn new() -> Self {
        Self {
            name: "simulation",
            version: env!("CARGO_PKG_VERSION"),
            config: None,
            position: None,
            writes: 0,
            log: None,
        }
    }

    /// Create a simulation driver that records every write into `log`.
    pub fn with_log(log: PositionLog) -> Self {
        Self {
            log: Some(log),
            ..Self::new()
        }
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ServoDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        self.name
    }

    fn version(&self) -> &'static str {
        self.version
    }

    fn init(&mut self, config: &ServoConfig) -> Result<(), DriverError> {
        info!(
            "Simulation servo ready (pulse {}/{}/{} us, period {} ms)",
            config.pulse_min_us, config.pulse_neutral_us, config.pulse_max_us, config.period_ms
        );
        self.config = Some(config.clone());
        Ok(())
    }

    fn set_position(&mut self, position: CommandedPosition) -> Result<(), DriverError> {
        let Some(config) = &self.config else {
            return Err(DriverError::NotInitialized(self.name));
        };
        trace!(
            "sim servo -> {} ({} us)",
            position,
            pulse_width_us(position, config)
        );
        self.position = Some(position);
        self.writes += 1;
        if let Some(log) = &self.log {
            log.record(position);
        }
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        debug!(
            "Simulation servo released after {} writes (last={:?})",
            self.writes, self.position
        );
        self.config = None;
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        let custom = match (&self.config, self.position) {
            (Some(config), Some(pos)) => Some(format!("pulse={}us", pulse_width_us(pos, config))),
            _ => None,
        };
        Some(DriverDiagnostics {
            writes: self.writes,
            last_position: self.position,
            custom,
        })
    }
}

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn ServoDriver> {
    Box::new(SimulationDriver::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_before_init_rejected() {
        let mut driver = SimulationDriver::new();
        let result = driver.set_position(CommandedPosition::CENTER);
        assert!(matches!(result, Err(DriverError::NotInitialized("simulation"))));
    }

    #[test]
    fn writes_are_logged_in_order() {
        let log = PositionLog::new();
        let mut driver = SimulationDriver::with_log(log.clone());
        driver.init(&ServoConfig::default()).unwrap();

        driver.set_position(CommandedPosition::new(-1.0)).unwrap();
        driver.set_position(CommandedPosition::new(-0.95)).unwrap();
        driver.set_position(CommandedPosition::CENTER).unwrap();

        assert_eq!(log.values(), vec![-1.0, -0.95, 0.0]);
        let samples = log.snapshot();
        assert!(samples[0].at <= samples[2].at);

        let diag = driver.diagnostics().unwrap();
        assert_eq!(diag.writes, 3);
        assert_eq!(diag.last_position, Some(CommandedPosition::CENTER));
        assert_eq!(diag.custom.as_deref(), Some("pulse=1500us"));
    }

    #[test]
    fn write_after_shutdown_rejected() {
        let mut driver = SimulationDriver::new();
        driver.init(&ServoConfig::default()).unwrap();
        driver.shutdown().unwrap();
        assert!(driver.set_position(CommandedPosition::MAX).is_err());
    }
}
