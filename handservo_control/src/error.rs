//! Error types for the controller and the session loop.
//!
//! The sweep controller itself has no failure modes of its own; errors
//! here come from the actuator driver, from thread creation, or from the
//! perception side at the session boundary.

use handservo_common::driver::DriverError;
use handservo_common::hand::CaptureError;
use thiserror::Error;

/// Sweep controller errors.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The actuator driver rejected a write or failed to release.
    #[error("Actuator error: {0}")]
    Driver(#[from] DriverError),

    /// The sweep worker thread could not be started.
    #[error("Failed to spawn sweep worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// The sweep worker panicked instead of returning its report.
    #[error("Sweep worker panicked")]
    WorkerPanicked,

    /// Operation attempted after `shutdown()`.
    #[error("Sweep controller has been shut down")]
    ShutDown,
}

/// Session loop errors.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A frame could not be obtained. Ends the session.
    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    /// The controller failed while applying a decision or shutting down.
    #[error(transparent)]
    Control(#[from] ControlError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_error_converts() {
        let err: ControlError = DriverError::NotInitialized("simulation").into();
        assert!(matches!(err, ControlError::Driver(_)));
        assert!(err.to_string().contains("simulation"));
    }

    #[test]
    fn session_error_wraps_capture() {
        let err: SessionError = CaptureError::Device("camera unplugged".to_string()).into();
        assert!(err.to_string().contains("camera unplugged"));
    }
}
