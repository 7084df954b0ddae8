//! Workspace-wide constants.
//!
//! Single source of truth for numeric limits, reference sweep timing and
//! default paths. Imported by all crates.

use static_assertions::const_assert;

/// Maximum number of simultaneously tracked hands.
pub const MAX_HANDS: usize = 2;

/// Number of fingers on a hand.
pub const MAX_FINGERS: u8 = 5;

/// Finger count that activates the sweep.
pub const DEFAULT_TRIGGER_FINGERS: u8 = 3;

/// Lower extreme of the commanded range.
pub const POSITION_MIN: f64 = -1.0;

/// Upper extreme of the commanded range.
pub const POSITION_MAX: f64 = 1.0;

/// Center of the commanded range.
pub const POSITION_CENTER: f64 = 0.0;

/// Full angular travel of the servo in degrees.
pub const SERVO_TRAVEL_DEG: f64 = 180.0;

/// Position increment per sweep step (fraction of the normalized range).
pub const DEFAULT_SWEEP_STEP: f64 = 0.05;

/// Delay between sweep steps [ms].
pub const DEFAULT_STEP_DELAY_MS: u64 = 50;

/// Pause after centering on `stop()` [ms].
pub const DEFAULT_CENTER_SETTLE_MS: u64 = 100;

/// Pause after centering on shutdown [ms].
pub const DEFAULT_SHUTDOWN_SETTLE_MS: u64 = 200;

/// Upper bound accepted for any configured delay [ms].
pub const MAX_DELAY_MS: u64 = 10_000;

/// Default PWM period [ms] (50 Hz).
pub const DEFAULT_PWM_PERIOD_MS: u64 = 20;

/// Default pulse width at the lower extreme [µs].
pub const DEFAULT_PULSE_MIN_US: u64 = 1000;

/// Default pulse width at center [µs].
pub const DEFAULT_PULSE_NEUTRAL_US: u64 = 1500;

/// Default pulse width at the upper extreme [µs].
pub const DEFAULT_PULSE_MAX_US: u64 = 2000;

/// Default driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Canonical service name used for logging.
pub const SERVICE_NAME: &str = "handservo";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/handservo.toml";

const_assert!(MAX_HANDS == 2);
const_assert!(DEFAULT_TRIGGER_FINGERS <= MAX_FINGERS);
const_assert!(DEFAULT_PULSE_MIN_US < DEFAULT_PULSE_NEUTRAL_US);
const_assert!(DEFAULT_PULSE_NEUTRAL_US < DEFAULT_PULSE_MAX_US);
const_assert!(DEFAULT_PULSE_MAX_US < DEFAULT_PWM_PERIOD_MS * 1000);
