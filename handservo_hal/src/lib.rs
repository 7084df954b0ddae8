//! # handservo HAL Library
//!
//! Actuator side of handservo: pluggable servo drivers behind the
//! `ServoDriver` trait defined in `handservo_common::driver`.
//!
//! # Module Structure
//!
//! - [`actuator`] - Shared handle that serializes writes to the driver
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Driver implementations
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐     ┌──────────────┐     ┌────────────────────┐
//! │ SweepController│────►│  Actuator    │────►│  ServoDriver       │
//! │ + sweep worker │     │ (Arc<Mutex>) │     │  simulation | pwm  │
//! └────────────────┘     └──────────────┘     └────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod actuator;
pub mod driver_registry;
pub mod drivers;

pub use crate::actuator::Actuator;
pub use crate::driver_registry::DriverRegistry;
pub use crate::drivers::simulation::{PositionLog, PositionSample, SimulationDriver};
