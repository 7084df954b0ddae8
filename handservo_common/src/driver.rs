//! Servo driver trait and error types.
//!
//! This module defines:
//! - `ServoDriver` trait - Interface for pluggable actuator backends
//! - `DriverError` enum - Error types for driver operations
//! - `DriverFactory` type alias - Factory function type
//! - `DriverDiagnostics` struct - Optional driver diagnostics

use crate::config::ServoConfig;
use crate::servo::CommandedPosition;
use thiserror::Error;

/// Error types for driver operations.
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// Driver initialization failed.
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hardware communication error.
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Driver not found.
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Write attempted before `init()` or after `shutdown()`.
    #[error("Driver '{0}' is not initialized")]
    NotInitialized(&'static str),
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn ServoDriver>;

/// Optional driver diagnostics.
#[derive(Debug, Clone, Default)]
pub struct DriverDiagnostics {
    /// Number of position writes accepted.
    pub writes: u64,
    /// Last position written, if any.
    pub last_position: Option<CommandedPosition>,
    /// Driver-specific detail (e.g. pulse width).
    pub custom: Option<String>,
}

/// Trait defining the interface for servo drivers.
///
/// The driver is the physical PWM output primitive. It is never called
/// concurrently: the `Actuator` handle serializes access.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the first write
/// 2. `set_position()` - Called for every sweep step and every centering
/// 3. `shutdown()` - Called once when the actuator is released
pub trait ServoDriver: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "pwm").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver with servo configuration.
    ///
    /// # Errors
    /// Return `DriverError::InitFailed` if the output cannot be acquired.
    fn init(&mut self, config: &ServoConfig) -> Result<(), DriverError>;

    /// Drive the output toward `position`.
    fn set_position(&mut self, position: CommandedPosition) -> Result<(), DriverError>;

    /// Release the output. Further writes must fail.
    fn shutdown(&mut self) -> Result<(), DriverError>;

    /// Get driver-specific diagnostics.
    /// Default: None
    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_display() {
        let err = DriverError::InitFailed("pwm busy".to_string());
        assert!(err.to_string().contains("pwm busy"));

        let err = DriverError::DriverNotFound("stepper".to_string());
        assert!(err.to_string().contains("stepper"));

        let err = DriverError::NotInitialized("simulation");
        assert!(err.to_string().contains("simulation"));
    }

    #[test]
    fn test_driver_diagnostics_default() {
        let diag = DriverDiagnostics::default();
        assert_eq!(diag.writes, 0);
        assert!(diag.last_position.is_none());
        assert!(diag.custom.is_none());
    }
}
