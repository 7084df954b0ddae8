//! Servo driver lookup by name.
//!
//! `[servo].driver` in the config (or `--driver`) names the output to use.
//! The registry maps those names to factories; it is built once in `main`
//! and handed to [`Actuator::open`](crate::Actuator::open).

use handservo_common::driver::{DriverError, DriverFactory, ServoDriver};
use std::collections::BTreeMap;

use crate::drivers::register_all_drivers;

/// Named servo driver factories, kept in name order.
#[derive(Default)]
pub struct DriverRegistry {
    factories: BTreeMap<&'static str, DriverFactory>,
}

impl DriverRegistry {
    /// Registry with no drivers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `simulation` and, on `rpi` builds, `pwm`.
    pub fn with_builtin_drivers() -> Self {
        let mut registry = Self::new();
        register_all_drivers(&mut registry);
        registry
    }

    /// Add a servo output under `name`.
    ///
    /// # Panics
    /// If `name` is taken. Names are compile-time constants, so a clash is a
    /// programming error rather than a configuration one.
    pub fn register(&mut self, name: &'static str, factory: DriverFactory) {
        let previous = self.factories.insert(name, factory);
        assert!(previous.is_none(), "Servo driver '{name}' is already registered");
    }

    /// True if a driver called `name` is available.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Factory for `name`, if registered.
    pub fn get_factory(&self, name: &str) -> Option<DriverFactory> {
        self.factories.get(name).copied()
    }

    /// Build an uninitialized driver for `name`.
    ///
    /// # Errors
    /// `DriverError::DriverNotFound` naming the requested driver and the
    /// ones that are available, so a typo in the config is easy to spot.
    pub fn create_driver(&self, name: &str) -> Result<Box<dyn ServoDriver>, DriverError> {
        match self.get_factory(name) {
            Some(factory) => Ok(factory()),
            None => Err(DriverError::DriverNotFound(format!(
                "'{name}' (available: {})",
                self.list_drivers().join(", ")
            ))),
        }
    }

    /// Registered driver names in alphabetical order.
    pub fn list_drivers(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }
}

impl std::fmt::Debug for DriverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.factories.keys()).finish()
    }
}
