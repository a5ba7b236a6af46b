//! Duty-cycle value types

use core::fmt;

use super::clamp::clamp;
use crate::config::{ConfigError, ControlConfig, DUTY_CYCLE_MAX};

/// Fan PWM duty cycle in percent, always within `0..=100`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyCycle(u8);

impl DutyCycle {
    /// Fans stopped
    pub const OFF: Self = Self(0);

    /// Fans at full speed
    pub const FULL: Self = Self(DUTY_CYCLE_MAX);

    /// Create a duty cycle, `None` above 100%
    pub const fn new(percent: u8) -> Option<Self> {
        if percent > DUTY_CYCLE_MAX {
            None
        } else {
            Some(Self(percent))
        }
    }

    /// Saturate an arbitrary value into `bounds`
    pub const fn clamped(value: i32, bounds: DutyBounds) -> Self {
        Self(clamp(value, bounds.low as i32, bounds.high as i32) as u8)
    }

    /// Duty cycle in percent
    pub const fn percent(self) -> u8 {
        self.0
    }
}

impl fmt::Display for DutyCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Validated `[low, high]` duty-cycle range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DutyBounds {
    low: u8,
    high: u8,
}

impl Default for DutyBounds {
    fn default() -> Self {
        Self::FULL_RANGE
    }
}

impl DutyBounds {
    /// `[0, 100]`
    pub const FULL_RANGE: Self = Self {
        low: 0,
        high: DUTY_CYCLE_MAX,
    };

    /// Create a range, rejecting `low > high` and `high > 100`
    pub const fn new(low: u8, high: u8) -> Result<Self, ConfigError> {
        if high > DUTY_CYCLE_MAX {
            return Err(ConfigError::DutyBoundsOutOfRange { high });
        }
        if low > high {
            return Err(ConfigError::InvertedClampBounds { low, high });
        }
        Ok(Self { low, high })
    }

    /// Range configured in `config`
    pub const fn from_config(config: &ControlConfig) -> Result<Self, ConfigError> {
        Self::new(config.duty_min, config.duty_max)
    }

    /// Lowest allowed duty cycle
    pub const fn low(&self) -> DutyCycle {
        DutyCycle(self.low)
    }

    /// Highest allowed duty cycle
    pub const fn high(&self) -> DutyCycle {
        DutyCycle(self.high)
    }
}
