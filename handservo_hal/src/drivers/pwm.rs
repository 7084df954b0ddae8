//! Raspberry Pi hardware PWM driver.
//!
//! Drives a hobby servo from one of the two hardware PWM channels through
//! `rppal`. Don't power the servo from the Pi's 5V header; use a separate
//! supply with a shared ground.
//!
//! Channel 0 is BCM GPIO 12 or 18, channel 1 is BCM GPIO 13 or 19,
//! depending on the overlay enabled in `/boot/config.txt`.

use super::pulse::pulse_width;
use handservo_common::config::ServoConfig;
use handservo_common::driver::{DriverDiagnostics, DriverError, ServoDriver};
use handservo_common::servo::CommandedPosition;
use rppal::pwm::{Channel, Polarity, Pwm};
use tracing::{debug, info};

/// Hardware PWM servo driver.
pub struct PwmServoDriver {
    pwm: Option<Pwm>,
    config: ServoConfig,
    position: Option<CommandedPosition>,
    writes: u64,
}

impl PwmServoDriver {
    /// Create an unopened driver. The channel is acquired in `init()`.
    pub fn new() -> Self {
        Self {
            pwm: None,
            config: ServoConfig::default(),
            position: None,
            writes: 0,
        }
    }
}

impl Default for PwmServoDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn channel_for(index: u8) -> Result<Channel, DriverError> {
    match index {
        0 => Ok(Channel::Pwm0),
        1 => Ok(Channel::Pwm1),
        other => Err(DriverError::ConfigError(format!(
            "unsupported PWM channel {other}"
        ))),
    }
}

impl ServoDriver for PwmServoDriver {
    fn name(&self) -> &'static str {
        "pwm"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &ServoConfig) -> Result<(), DriverError> {
        let channel = channel_for(config.pwm_channel)?;
        // Enabled at neutral so the horn does not jump on power-up.
        let pwm = Pwm::with_period(
            channel,
            config.period(),
            pulse_width(CommandedPosition::CENTER, config),
            Polarity::Normal,
            true,
        )
        .map_err(|e| DriverError::InitFailed(format!("PWM channel {}: {e}", config.pwm_channel)))?;

        info!(
            "PWM servo on channel {} (period {} ms, pulse {}/{}/{} us)",
            config.pwm_channel,
            config.period_ms,
            config.pulse_min_us,
            config.pulse_neutral_us,
            config.pulse_max_us
        );
        self.config = config.clone();
        self.pwm = Some(pwm);
        Ok(())
    }

    fn set_position(&mut self, position: CommandedPosition) -> Result<(), DriverError> {
        let pwm = self.pwm.as_ref().ok_or(DriverError::NotInitialized("pwm"))?;
        pwm.set_pulse_width(pulse_width(position, &self.config))
            .map_err(|e| DriverError::CommunicationError(e.to_string()))?;
        self.position = Some(position);
        self.writes += 1;
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), DriverError> {
        if let Some(pwm) = self.pwm.take() {
            pwm.disable()
                .map_err(|e| DriverError::CommunicationError(e.to_string()))?;
            debug!("PWM channel {} disabled", self.config.pwm_channel);
        }
        Ok(())
    }

    fn diagnostics(&self) -> Option<DriverDiagnostics> {
        Some(DriverDiagnostics {
            writes: self.writes,
            last_position: self.position,
            custom: self
                .position
                .map(|p| format!("pulse={}us", pulse_width(p, &self.config).as_micros())),
        })
    }
}

/// Factory function to create a PWM driver instance.
pub fn create_driver() -> Box<dyn ServoDriver> {
    Box::new(PwmServoDriver::new())
}
