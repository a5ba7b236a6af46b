//! Temperature aggregation
//!
//! Pure computations over one [`TemperatureSnapshot`]. An empty snapshot has
//! no average and no maximum; callers get [`StatsError::EmptySnapshot`] and
//! must decide what that means for them.

use core::fmt;

use fancontroller_protocol::TemperatureSnapshot;

use crate::config::Thresholds;

/// Errors from aggregate computations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatsError {
    /// Snapshot holds no readings
    EmptySnapshot,
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatsError::EmptySnapshot => f.write_str("snapshot has no readings"),
        }
    }
}

/// Mean temperature in 0.1°C units, rounded down
pub fn average_x10(snapshot: &TemperatureSnapshot) -> Result<u32, StatsError> {
    let count = snapshot.len() as u32;
    if count == 0 {
        return Err(StatsError::EmptySnapshot);
    }
    Ok(sum(snapshot) * 10 / count)
}

/// Hottest present reading
pub fn max(snapshot: &TemperatureSnapshot) -> Result<u16, StatsError> {
    snapshot.celsius().max().ok_or(StatsError::EmptySnapshot)
}

/// Number of supplies at or above the "on" threshold
pub fn active_count(snapshot: &TemperatureSnapshot, thresholds: &Thresholds) -> u8 {
    snapshot
        .celsius()
        .filter(|&c| thresholds.is_supply_active(c))
        .count() as u8
}

fn sum(snapshot: &TemperatureSnapshot) -> u32 {
    snapshot.celsius().map(u32::from).sum()
}

/// Derived view over one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AggregateStats {
    sum: u32,
    count: u8,
    max: u16,
    active_count: u8,
}

impl AggregateStats {
    /// Aggregate a snapshot
    pub fn from_snapshot(
        snapshot: &TemperatureSnapshot,
        thresholds: &Thresholds,
    ) -> Result<Self, StatsError> {
        Ok(Self {
            max: max(snapshot)?,
            sum: sum(snapshot),
            count: snapshot.len() as u8,
            active_count: active_count(snapshot, thresholds),
        })
    }

    /// Mean temperature in 0.1°C units, rounded down
    pub fn average_x10(&self) -> u32 {
        self.sum * 10 / u32::from(self.count)
    }

    /// Check if the exact mean is strictly above `limit_c`
    pub fn average_exceeds(&self, limit_c: u16) -> bool {
        self.sum > u32::from(limit_c) * u32::from(self.count)
    }

    /// Hottest reading (°C)
    pub fn max(&self) -> u16 {
        self.max
    }

    /// Supplies counted as running
    pub fn active_count(&self) -> u8 {
        self.active_count
    }
}
