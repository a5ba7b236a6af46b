//! Indicator and fan PWM outputs
//!
//! Adapters for embedded-hal pins and PWM channels are provided so the
//! firmware can plug HAL types in directly.

use embedded_hal::digital::OutputPin;
use embedded_hal::pwm::SetDutyCycle;

use crate::control::DutyCycle;

/// Boolean indicator (status LED)
pub trait IndicatorOutput {
    /// Turn the indicator on or off
    fn set(&mut self, on: bool);
}

/// Fan PWM output
pub trait PwmActuator {
    /// Drive the fans at `duty`
    fn apply(&mut self, duty: DutyCycle);
}

/// Indicator on a GPIO pin
///
/// The pin can be configured as active-high (default) or active-low.
pub struct PinIndicator<P> {
    pin: P,
    /// If true, indicator ON = pin LOW
    inverted: bool,
    on: bool,
    failures: u32,
}

impl<P: OutputPin> PinIndicator<P> {
    /// Create an indicator, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut indicator = Self {
            pin,
            inverted,
            on: false,
            failures: 0,
        };
        indicator.set(false);
        indicator
    }

    /// Number of pin writes that failed so far
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

impl<P: OutputPin> IndicatorOutput for PinIndicator<P> {
    fn set(&mut self, on: bool) {
        self.on = on;

        let result = if on != self.inverted {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };

        // The next update retries; the owner watches `failures()`
        if result.is_err() {
            self.failures = self.failures.wrapping_add(1);
        }
    }
}

/// Fan driven by a PWM channel
pub struct PwmFan<P> {
    pwm: P,
    applied: DutyCycle,
}

impl<P: SetDutyCycle> PwmFan<P> {
    /// Create a fan output, starting stopped
    pub fn new(pwm: P) -> Self {
        let mut fan = Self {
            pwm,
            applied: DutyCycle::OFF,
        };
        fan.apply(DutyCycle::OFF);
        fan
    }

    /// Last duty cycle written
    pub fn applied(&self) -> DutyCycle {
        self.applied
    }
}

impl<P: SetDutyCycle> PwmActuator for PwmFan<P> {
    fn apply(&mut self, duty: DutyCycle) {
        if self.pwm.set_duty_cycle_percent(duty.percent()).is_ok() {
            self.applied = duty;
        }
    }
}
