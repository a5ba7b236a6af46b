//! Configuration type definitions

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::stats::AggregateStats;

/// Upper limit of any duty cycle (percent)
pub const DUTY_CYCLE_MAX: u8 = 100;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Lower duty bound is above the upper bound
    InvertedClampBounds { low: u8, high: u8 },
    /// Upper duty bound is above 100%
    DutyBoundsOutOfRange { high: u8 },
    /// Speed increase of zero would never add cooling
    ZeroIncrement,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvertedClampBounds { low, high } => {
                write!(f, "duty_min {} is above duty_max {}", low, high)
            }
            ConfigError::DutyBoundsOutOfRange { high } => {
                write!(f, "duty_max {} is above {}", high, DUTY_CYCLE_MAX)
            }
            ConfigError::ZeroIncrement => f.write_str("speed_increase must be non-zero"),
        }
    }
}

/// Temperature thresholds (°C)
///
/// The "supply on" test and the two "too hot" tests are independent
/// predicates; changing one never shifts the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Thresholds {
    /// A supply reading at or above this is running; below it is off/idle
    pub supply_on_c: u16,
    /// Mean temperature strictly above this calls for extra cooling
    pub average_cutoff_c: u16,
    /// Any single supply strictly above this calls for extra cooling
    pub single_cutoff_c: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Thresholds {
    /// Factory thresholds
    pub const DEFAULT: Self = Self {
        supply_on_c: 20,
        average_cutoff_c: 60,
        single_cutoff_c: 70,
    };

    /// Check if a supply at this temperature counts as running
    pub fn is_supply_active(&self, celsius: u16) -> bool {
        celsius >= self.supply_on_c
    }

    /// Check if the hottest supply is past the single-supply cutoff
    pub fn max_exceeds_cutoff(&self, max_c: u16) -> bool {
        max_c > self.single_cutoff_c
    }

    /// Check if the mean temperature is past the average cutoff
    pub fn average_exceeds_cutoff(&self, stats: &AggregateStats) -> bool {
        stats.average_exceeds(self.average_cutoff_c)
    }
}

/// Duty-cycle controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ControlConfig {
    /// Temperature thresholds
    pub thresholds: Thresholds,
    /// Duty-cycle step (percent) used by the speed increase path
    pub speed_increase: u8,
    /// Lowest duty cycle the controller will output (percent)
    pub duty_min: u8,
    /// Highest duty cycle the controller will output (percent)
    pub duty_max: u8,
    /// Enter `TestRunning` on the first telemetry frame after `S`
    pub begin_test_on_telemetry: bool,
    /// Leave `Cooldown` once telemetry shows every supply off
    pub finish_cooldown_when_idle: bool,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl ControlConfig {
    /// Factory configuration
    pub const DEFAULT: Self = Self {
        thresholds: Thresholds::DEFAULT,
        speed_increase: 10,
        duty_min: 0,
        duty_max: DUTY_CYCLE_MAX,
        begin_test_on_telemetry: true,
        finish_cooldown_when_idle: true,
    };

    /// Check the configuration for values the controller cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duty_max > DUTY_CYCLE_MAX {
            return Err(ConfigError::DutyBoundsOutOfRange {
                high: self.duty_max,
            });
        }

        if self.duty_min > self.duty_max {
            return Err(ConfigError::InvertedClampBounds {
                low: self.duty_min,
                high: self.duty_max,
            });
        }

        if self.speed_increase == 0 {
            return Err(ConfigError::ZeroIncrement);
        }

        Ok(())
    }
}
