//! Configuration loading traits and types.
//!
//! All handservo settings live in a single TOML file:
//!
//! ```toml
//! [shared]
//! log_level = "info"
//! service_name = "handservo"
//!
//! [sweep]
//! step = 0.05
//! step_delay_ms = 50
//!
//! [decision]
//! trigger_fingers = 3
//!
//! [servo]
//! driver = "simulation"
//! ```
//!
//! Every section except `[shared]` may be omitted; missing fields take the
//! reference defaults from [`crate::consts`].

use crate::consts::{
    DEFAULT_CENTER_SETTLE_MS, DEFAULT_DRIVER, DEFAULT_PULSE_MAX_US, DEFAULT_PULSE_MIN_US,
    DEFAULT_PULSE_NEUTRAL_US, DEFAULT_PWM_PERIOD_MS, DEFAULT_SHUTDOWN_SETTLE_MS,
    DEFAULT_STEP_DELAY_MS, DEFAULT_SWEEP_STEP, DEFAULT_TRIGGER_FINGERS, MAX_DELAY_MS,
    MAX_FINGERS, POSITION_MAX, POSITION_MIN, SERVICE_NAME,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Equivalent `tracing` level.
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Common configuration fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Application instance identifier.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_service_name() -> String {
    SERVICE_NAME.to_string()
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            service_name: default_service_name(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// ─── Sweep ──────────────────────────────────────────────────────────

/// Oscillation parameters for the sweep controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SweepConfig {
    /// Lower extreme of a sweep (normalized).
    #[serde(default = "default_min_position")]
    pub min_position: f64,

    /// Upper extreme of a sweep (normalized).
    #[serde(default = "default_max_position")]
    pub max_position: f64,

    /// Position increment per step. Must divide the range evenly.
    #[serde(default = "default_step")]
    pub step: f64,

    /// Delay between steps [ms]. Also the worst-case stop latency.
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Pause after centering in `stop()` [ms].
    #[serde(default = "default_center_settle_ms")]
    pub center_settle_ms: u64,

    /// Pause after centering on shutdown, before release [ms].
    #[serde(default = "default_shutdown_settle_ms")]
    pub shutdown_settle_ms: u64,
}

fn default_min_position() -> f64 {
    POSITION_MIN
}
fn default_max_position() -> f64 {
    POSITION_MAX
}
fn default_step() -> f64 {
    DEFAULT_SWEEP_STEP
}
fn default_step_delay_ms() -> u64 {
    DEFAULT_STEP_DELAY_MS
}
fn default_center_settle_ms() -> u64 {
    DEFAULT_CENTER_SETTLE_MS
}
fn default_shutdown_settle_ms() -> u64 {
    DEFAULT_SHUTDOWN_SETTLE_MS
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            min_position: default_min_position(),
            max_position: default_max_position(),
            step: default_step(),
            step_delay_ms: default_step_delay_ms(),
            center_settle_ms: default_center_settle_ms(),
            shutdown_settle_ms: default_shutdown_settle_ms(),
        }
    }
}

impl SweepConfig {
    /// Tolerance when checking that `step` divides the range.
    const STEP_TOLERANCE: f64 = 1e-6;

    /// Delay between steps.
    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    /// Settle time after a `stop()`.
    pub fn center_settle(&self) -> Duration {
        Duration::from_millis(self.center_settle_ms)
    }

    /// Settle time after shutdown centering.
    pub fn shutdown_settle(&self) -> Duration {
        Duration::from_millis(self.shutdown_settle_ms)
    }

    /// Number of steps in one leg (min → max).
    pub fn steps_per_leg(&self) -> u32 {
        ((self.max_position - self.min_position) / self.step).round() as u32
    }

    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if !self.min_position.is_finite() || !self.max_position.is_finite() {
            return invalid("sweep positions must be finite".to_string());
        }
        if self.min_position < POSITION_MIN || self.max_position > POSITION_MAX {
            return invalid(format!(
                "sweep range [{}, {}] exceeds [{}, {}]",
                self.min_position, self.max_position, POSITION_MIN, POSITION_MAX
            ));
        }
        if self.min_position >= self.max_position {
            return invalid(format!(
                "min_position {} must be below max_position {}",
                self.min_position, self.max_position
            ));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            return invalid(format!("step {} must be positive", self.step));
        }
        let span = self.max_position - self.min_position;
        let legs = span / self.step;
        if legs < 1.0 - Self::STEP_TOLERANCE || (legs - legs.round()).abs() > Self::STEP_TOLERANCE {
            return invalid(format!(
                "step {} does not divide range {} evenly",
                self.step, span
            ));
        }
        if self.step_delay_ms == 0 || self.step_delay_ms > MAX_DELAY_MS {
            return invalid(format!(
                "step_delay_ms {} out of range [1, {}]",
                self.step_delay_ms, MAX_DELAY_MS
            ));
        }
        if self.center_settle_ms > MAX_DELAY_MS || self.shutdown_settle_ms > MAX_DELAY_MS {
            return invalid(format!("settle times must not exceed {MAX_DELAY_MS} ms"));
        }
        Ok(())
    }
}

// ─── Decision ───────────────────────────────────────────────────────

/// Decision loop parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecisionConfig {
    /// Finger count on the first hand that activates the sweep.
    #[serde(default = "default_trigger_fingers")]
    pub trigger_fingers: u8,
}

fn default_trigger_fingers() -> u8 {
    DEFAULT_TRIGGER_FINGERS
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            trigger_fingers: default_trigger_fingers(),
        }
    }
}

impl DecisionConfig {
    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger_fingers > MAX_FINGERS {
            return Err(ConfigError::ValidationError(format!(
                "trigger_fingers {} out of range [0, {}]",
                self.trigger_fingers, MAX_FINGERS
            )));
        }
        Ok(())
    }
}

// ─── Servo ──────────────────────────────────────────────────────────

/// Servo output parameters.
///
/// Pulse widths only matter to drivers that generate PWM; the simulation
/// driver ignores them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServoConfig {
    /// Driver name as registered in the driver registry.
    #[serde(default = "default_driver")]
    pub driver: String,

    /// Hardware PWM channel (0 = BCM GPIO 12/18, 1 = BCM GPIO 13/19).
    #[serde(default)]
    pub pwm_channel: u8,

    /// PWM period [ms].
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Pulse width at `-1.0` [µs].
    #[serde(default = "default_pulse_min_us")]
    pub pulse_min_us: u64,

    /// Pulse width at `0.0` [µs].
    #[serde(default = "default_pulse_neutral_us")]
    pub pulse_neutral_us: u64,

    /// Pulse width at `1.0` [µs].
    #[serde(default = "default_pulse_max_us")]
    pub pulse_max_us: u64,
}

fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}
fn default_period_ms() -> u64 {
    DEFAULT_PWM_PERIOD_MS
}
fn default_pulse_min_us() -> u64 {
    DEFAULT_PULSE_MIN_US
}
fn default_pulse_neutral_us() -> u64 {
    DEFAULT_PULSE_NEUTRAL_US
}
fn default_pulse_max_us() -> u64 {
    DEFAULT_PULSE_MAX_US
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            driver: default_driver(),
            pwm_channel: 0,
            period_ms: default_period_ms(),
            pulse_min_us: default_pulse_min_us(),
            pulse_neutral_us: default_pulse_neutral_us(),
            pulse_max_us: default_pulse_max_us(),
        }
    }
}

impl ServoConfig {
    /// PWM period.
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    /// Validate parameter bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::ValidationError(msg));

        if self.driver.is_empty() {
            return invalid("servo driver cannot be empty".to_string());
        }
        if self.pwm_channel > 1 {
            return invalid(format!("pwm_channel {} out of range [0, 1]", self.pwm_channel));
        }
        if self.period_ms == 0 {
            return invalid("period_ms must be positive".to_string());
        }
        if !(self.pulse_min_us < self.pulse_neutral_us && self.pulse_neutral_us < self.pulse_max_us)
        {
            return invalid(format!(
                "pulse widths must satisfy min < neutral < max (got {} / {} / {})",
                self.pulse_min_us, self.pulse_neutral_us, self.pulse_max_us
            ));
        }
        if self
            .period_ms
            .checked_mul(1000)
            .is_none_or(|period_us| self.pulse_max_us >= period_us)
        {
            return invalid(format!(
                "pulse_max_us {} must be shorter than the {} ms period",
                self.pulse_max_us, self.period_ms
            ));
        }
        Ok(())
    }
}

// ─── Top-Level ──────────────────────────────────────────────────────

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Logging and identity.
    #[serde(default)]
    pub shared: SharedConfig,
    /// Sweep timing.
    #[serde(default)]
    pub sweep: SweepConfig,
    /// Trigger rule.
    #[serde(default)]
    pub decision: DecisionConfig,
    /// Actuator output.
    #[serde(default)]
    pub servo: ServoConfig,
}

impl AppConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.sweep.validate()?;
        self.decision.validate()?;
        self.servo.validate()?;
        Ok(())
    }
}

/// Load and validate an [`AppConfig`] from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    load_config_with(path, &ConfigOverrides::default())
}

/// Load an [`AppConfig`], apply `overrides`, then validate the result.
///
/// A bad value in the file is accepted if an override replaces it.
pub fn load_config_with(path: &Path, overrides: &ConfigOverrides) -> Result<AppConfig, ConfigError> {
    let mut config = AppConfig::load(path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `[servo].driver`.
    pub driver: Option<String>,
    /// Replaces `[decision].trigger_fingers`.
    pub trigger_fingers: Option<u8>,
}

impl ConfigOverrides {
    /// Write every set override into `config`. Does not validate.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(driver) = &self.driver {
            config.servo.driver = driver.clone();
        }
        if let Some(trigger) = self.trigger_fingers {
            config.decision.trigger_fingers = trigger;
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
