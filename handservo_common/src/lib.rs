//! handservo Common Library
//!
//! Shared types, traits and configuration for all handservo crates.
//!
//! # Module Structure
//!
//! - [`servo`] - Commanded position and sweep state
//! - [`hand`] - Hand observations and the perception trait
//! - [`driver`] - Servo driver trait and errors
//! - [`config`] - TOML configuration loading
//! - [`consts`] - Numeric limits and reference timing
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod driver;
pub mod hand;
pub mod prelude;
pub mod servo;
