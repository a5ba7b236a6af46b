//! One-line status text for displays and logs

use core::fmt::{self, Write};

use heapless::String;

use crate::control::{ControlMode, DutyCycle};
use crate::stats::{AggregateStats, StatsError};

/// Capacity of a status line
pub const STATUS_LINE_CAPACITY: usize = 48;

/// Formatted status, e.g. `TEST D:70% A:62.5 M:75 N:4`
///
/// Aggregates show `--` while no snapshot is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    text: String<STATUS_LINE_CAPACITY>,
}

impl StatusLine {
    /// Format a status line
    pub fn new(
        mode: ControlMode,
        duty: DutyCycle,
        stats: &Result<AggregateStats, StatsError>,
    ) -> Self {
        let mut text = String::new();
        // Worst case is well under capacity, so this cannot fail
        let _ = write_status(&mut text, mode, duty, stats);
        Self { text }
    }

    /// The formatted text
    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn write_status<W: Write>(
    out: &mut W,
    mode: ControlMode,
    duty: DutyCycle,
    stats: &Result<AggregateStats, StatsError>,
) -> fmt::Result {
    write!(out, "{} D:{}", mode.label(), duty)?;

    match stats {
        Ok(stats) => {
            let avg = stats.average_x10();
            write!(
                out,
                " A:{}.{} M:{} N:{}",
                avg / 10,
                avg % 10,
                stats.max(),
                stats.active_count()
            )
        }
        Err(StatsError::EmptySnapshot) => out.write_str(" A:-- M:-- N:--"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Thresholds;
    use fancontroller_protocol::TemperatureSnapshot;

    fn stats(values: &[u16]) -> Result<AggregateStats, StatsError> {
        let snapshot = TemperatureSnapshot::from_celsius(values).unwrap();
        AggregateStats::from_snapshot(&snapshot, &Thresholds::default())
    }

    #[test]
    fn test_status_with_stats() {
        let line = StatusLine::new(
            ControlMode::TestRunning,
            DutyCycle::new(70).unwrap(),
            &stats(&[45, 60, 55, 10]),
        );
        assert_eq!(line.as_str(), "TEST D:70% A:42.5 M:60 N:3");
    }

    #[test]
    fn test_status_without_stats() {
        let line = StatusLine::new(
            ControlMode::Idle,
            DutyCycle::OFF,
            &Err(StatsError::EmptySnapshot),
        );
        assert_eq!(line.as_str(), "IDLE D:0% A:-- M:-- N:--");
    }

    #[test]
    fn test_status_worst_case_fits() {
        let line = StatusLine::new(
            ControlMode::Startup,
            DutyCycle::FULL,
            &stats(&[u16::MAX; 10]),
        );
        assert_eq!(line.as_str(), "START D:100% A:65535.0 M:65535 N:10");
    }
}
