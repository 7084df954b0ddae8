//! Position → pulse width mapping.
//!
//! Servos are driven by a pulse repeated every PWM period. The pulse width
//! encodes the target angle: `pulse_min_us` at one extreme,
//! `pulse_neutral_us` at center and `pulse_max_us` at the other extreme.
//! The mapping is linear on each side of neutral, so an asymmetric
//! calibration still puts `0.0` exactly at neutral.

use handservo_common::config::ServoConfig;
use handservo_common::servo::CommandedPosition;
use std::time::Duration;

/// Pulse width in microseconds for `position`.
pub fn pulse_width_us(position: CommandedPosition, config: &ServoConfig) -> u64 {
    let v = position.value();
    let neutral = config.pulse_neutral_us as f64;
    let width = if v >= 0.0 {
        neutral + v * (config.pulse_max_us as f64 - neutral)
    } else {
        neutral + v * (neutral - config.pulse_min_us as f64)
    };
    width.round() as u64
}

/// Pulse width for `position` as a `Duration`.
pub fn pulse_width(position: CommandedPosition, config: &ServoConfig) -> Duration {
    Duration::from_micros(pulse_width_us(position, config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_and_center() {
        let config = ServoConfig::default();
        assert_eq!(pulse_width_us(CommandedPosition::MIN, &config), 1000);
        assert_eq!(pulse_width_us(CommandedPosition::CENTER, &config), 1500);
        assert_eq!(pulse_width_us(CommandedPosition::MAX, &config), 2000);
        assert_eq!(pulse_width_us(CommandedPosition::new(0.5), &config), 1750);
    }

    #[test]
    fn asymmetric_calibration() {
        let config = ServoConfig {
            pulse_min_us: 600,
            pulse_neutral_us: 1500,
            pulse_max_us: 2250,
            ..ServoConfig::default()
        };
        assert_eq!(pulse_width_us(CommandedPosition::new(-0.5), &config), 1050);
        assert_eq!(pulse_width_us(CommandedPosition::new(0.5), &config), 1875);
        assert_eq!(
            pulse_width(CommandedPosition::MAX, &config),
            Duration::from_micros(2250)
        );
    }
}
