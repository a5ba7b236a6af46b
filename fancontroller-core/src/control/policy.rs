//! Pluggable duty-cycle policies
//!
//! The startup ramp, the cooldown run-on, the per-channel validity check and
//! the telemetry-driven duty computation are product decisions that are not
//! settled yet. They are hooks on [`ControlPolicy`]; the default methods are
//! placeholders that leave the duty cycle untouched.

use fancontroller_protocol::{TemperatureSnapshot, POWER_SUPPLY_COUNT};

use super::duty::DutyCycle;

/// Per-channel validity flags (bit N = channel N)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataValidity(u16);

impl DataValidity {
    /// No channel valid
    pub const NONE: Self = Self(0);

    /// First `count` channels valid
    pub fn all(count: usize) -> Self {
        let count = count.min(POWER_SUPPLY_COUNT);
        Self(((1u32 << count) - 1) as u16)
    }

    /// Mark one channel valid or invalid
    pub fn set(&mut self, channel: usize, valid: bool) {
        if channel >= POWER_SUPPLY_COUNT {
            return;
        }
        if valid {
            self.0 |= 1 << channel;
        } else {
            self.0 &= !(1 << channel);
        }
    }

    /// Check one channel
    pub fn is_valid(&self, channel: usize) -> bool {
        channel < POWER_SUPPLY_COUNT && self.0 & (1 << channel) != 0
    }

    /// Number of valid channels
    pub fn valid_count(&self) -> u32 {
        self.0.count_ones()
    }

    /// Raw bitmask
    pub fn bits(&self) -> u16 {
        self.0
    }
}

/// Duty-cycle policy hooks called by the controller
///
/// Returned duty cycles are clamped to the configured bounds afterwards.
pub trait ControlPolicy {
    /// Run when `S` arrives
    fn startup(&mut self, current: DutyCycle) -> DutyCycle {
        current
    }

    /// Run when `E` arrives, with the last known snapshot
    fn cooldown(&mut self, current: DutyCycle, _last: &TemperatureSnapshot) -> DutyCycle {
        current
    }

    /// Flag which channels of a fresh snapshot can be trusted
    fn check_validity(&self, snapshot: &TemperatureSnapshot) -> DataValidity {
        DataValidity::all(snapshot.len())
    }

    /// Compute the duty cycle from a fresh snapshot
    ///
    /// `previous` is the snapshot that was last known before this one.
    fn determine(
        &mut self,
        _validity: DataValidity,
        _snapshot: &TemperatureSnapshot,
        _previous: &TemperatureSnapshot,
        current: DutyCycle,
    ) -> DutyCycle {
        current
    }
}

/// Policy using every placeholder hook
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderPolicy;

impl ControlPolicy for PlaceholderPolicy {}
