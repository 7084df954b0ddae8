//! Servo driver implementations.
//!
//! - [`simulation`] - Software driver for development and testing
//! - [`pwm`] - Raspberry Pi hardware PWM (feature `rpi`)
//! - [`pulse`] - Position → pulse width mapping shared by drivers
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `ServoDriver` trait from `handservo_common::driver`
//! 3. Register the driver in [`register_all_drivers`]

pub mod pulse;
#[cfg(feature = "rpi")]
pub mod pwm;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register("simulation", simulation::create_driver);

    #[cfg(feature = "rpi")]
    registry.register("pwm", pwm::create_driver);
}
