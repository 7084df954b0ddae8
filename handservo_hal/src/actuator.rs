//! Shared actuator handle.
//!
//! `Actuator` wraps the active driver so that the sweep worker and the
//! controller can both command it. Writes are serialized through a mutex;
//! the last commanded position is mirrored in an atomic so it can be
//! sampled without taking the driver lock.

use crate::driver_registry::DriverRegistry;
use handservo_common::config::ServoConfig;
use handservo_common::driver::{DriverDiagnostics, DriverError, ServoDriver};
use handservo_common::servo::CommandedPosition;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, warn};

struct ActuatorInner {
    driver: Mutex<Box<dyn ServoDriver>>,
    driver_name: &'static str,
    /// `f64` bits of the last successfully commanded position.
    last_bits: AtomicU64,
    writes: AtomicU64,
    released: AtomicBool,
}

/// Cloneable handle to the initialized servo driver.
#[derive(Clone)]
pub struct Actuator {
    inner: Arc<ActuatorInner>,
}

impl Actuator {
    /// Initialize `driver` with `config` and wrap it.
    ///
    /// # Errors
    /// Propagates the driver's `init()` error.
    pub fn new(mut driver: Box<dyn ServoDriver>, config: &ServoConfig) -> Result<Self, DriverError> {
        driver.init(config)?;
        let driver_name = driver.name();
        info!("Actuator using driver {} v{}", driver_name, driver.version());

        Ok(Self {
            inner: Arc::new(ActuatorInner {
                driver: Mutex::new(driver),
                driver_name,
                last_bits: AtomicU64::new(CommandedPosition::CENTER.value().to_bits()),
                writes: AtomicU64::new(0),
                released: AtomicBool::new(false),
            }),
        })
    }

    /// Create the driver named in `config.driver` from `registry` and initialize it.
    pub fn open(registry: &DriverRegistry, config: &ServoConfig) -> Result<Self, DriverError> {
        let driver = registry.create_driver(&config.driver)?;
        Self::new(driver, config)
    }

    /// Write a position through the driver.
    ///
    /// # Errors
    /// `DriverError::NotInitialized` after [`release`](Self::release), or
    /// whatever the driver reports.
    pub fn command(&self, position: CommandedPosition) -> Result<(), DriverError> {
        let mut driver = self.inner.driver.lock();
        if self.inner.released.load(Ordering::Acquire) {
            return Err(DriverError::NotInitialized(self.inner.driver_name));
        }
        driver.set_position(position)?;
        self.inner
            .last_bits
            .store(position.value().to_bits(), Ordering::Release);
        self.inner.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Last successfully commanded position (center before the first write).
    pub fn position(&self) -> CommandedPosition {
        CommandedPosition::new(f64::from_bits(self.inner.last_bits.load(Ordering::Acquire)))
    }

    /// Number of successful writes.
    pub fn writes(&self) -> u64 {
        self.inner.writes.load(Ordering::Relaxed)
    }

    /// Name of the wrapped driver.
    pub fn driver_name(&self) -> &'static str {
        self.inner.driver_name
    }

    /// Driver diagnostics, if the driver provides any.
    pub fn diagnostics(&self) -> Option<DriverDiagnostics> {
        self.inner.driver.lock().diagnostics()
    }

    /// True once the driver has been shut down.
    pub fn is_released(&self) -> bool {
        self.inner.released.load(Ordering::Acquire)
    }

    /// Shut the driver down. Only the first call reaches the driver.
    ///
    /// Does not move the servo; center it first.
    pub fn release(&self) -> Result<(), DriverError> {
        let mut driver = self.inner.driver.lock();
        if self.inner.released.swap(true, Ordering::AcqRel) {
            debug!("Actuator already released");
            return Ok(());
        }
        info!(
            "Releasing actuator after {} writes (last position {})",
            self.writes(),
            self.position()
        );
        driver.shutdown().inspect_err(|e| {
            warn!("Driver shutdown failed: {e}");
        })
    }
}

impl std::fmt::Debug for Actuator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Actuator")
            .field("driver", &self.inner.driver_name)
            .field("position", &self.position())
            .field("writes", &self.writes())
            .field("released", &self.is_released())
            .finish()
    }
}
