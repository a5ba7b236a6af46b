//! Telemetry decoding
//!
//! A telemetry payload is a list of decimal temperatures, one per power
//! supply, split by field separators: `45;60;55`. Every separator closes a
//! reading, so an empty group reads as 0 (`45;;60` is `[45, 0, 60]`). The
//! final group is only kept when it has digits, which makes a trailing
//! separator harmless.

use core::fmt;

use heapless::Vec;

use crate::message::is_field_separator;

/// Number of monitored power supplies (snapshot capacity)
pub const POWER_SUPPLY_COUNT: usize = 10;

/// Errors that can occur while validating or decoding telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TelemetryError {
    /// Byte is neither a decimal digit nor a field separator
    InvalidTelemetry { position: usize, byte: u8 },
    /// Reading does not fit a temperature value
    ValueOverflow { channel: usize },
    /// More readings than monitored power supplies
    TooManyChannels { found: usize },
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidTelemetry { position, byte } => {
                write!(f, "invalid byte 0x{:02x} at {}", byte, position)
            }
            TelemetryError::ValueOverflow { channel } => {
                write!(f, "reading {} out of range", channel)
            }
            TelemetryError::TooManyChannels { found } => {
                write!(f, "{} readings, at most {} supported", found, POWER_SUPPLY_COUNT)
            }
        }
    }
}

/// A single power-supply temperature in whole degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureReading {
    channel: u8,
    celsius: u16,
}

impl TemperatureReading {
    /// Create a reading for a channel
    pub const fn new(channel: u8, celsius: u16) -> Self {
        Self { channel, celsius }
    }

    /// Zero-based power-supply index
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Temperature in degrees Celsius
    pub const fn celsius(&self) -> u16 {
        self.celsius
    }
}

/// One set of readings captured from a single telemetry frame
///
/// Holds at most [`POWER_SUPPLY_COUNT`] readings. Channels past `len()` are
/// absent, not zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TemperatureSnapshot {
    readings: Vec<TemperatureReading, POWER_SUPPLY_COUNT>,
}

impl TemperatureSnapshot {
    /// Create an empty snapshot
    pub const fn new() -> Self {
        Self {
            readings: Vec::new(),
        }
    }

    /// Build a snapshot from temperatures in channel order
    pub fn from_celsius(values: &[u16]) -> Result<Self, TelemetryError> {
        if values.len() > POWER_SUPPLY_COUNT {
            return Err(TelemetryError::TooManyChannels {
                found: values.len(),
            });
        }

        let mut snapshot = Self::new();
        for &celsius in values {
            snapshot.push(celsius);
        }
        Ok(snapshot)
    }

    /// Append the next channel, returns false when full
    fn push(&mut self, celsius: u16) -> bool {
        let channel = self.readings.len() as u8;
        self.readings
            .push(TemperatureReading::new(channel, celsius))
            .is_ok()
    }

    /// Number of present readings
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    /// Check if no readings are present
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Reading for a channel, `None` if the channel is absent
    pub fn get(&self, channel: usize) -> Option<TemperatureReading> {
        self.readings.get(channel).copied()
    }

    /// Present readings in channel order
    pub fn readings(&self) -> &[TemperatureReading] {
        &self.readings
    }

    /// Iterate over present temperatures in channel order
    pub fn celsius(&self) -> impl Iterator<Item = u16> + '_ {
        self.readings.iter().map(TemperatureReading::celsius)
    }
}

/// Decode a payload that already passed classification
pub(crate) fn parse(payload: &[u8]) -> Result<TemperatureSnapshot, TelemetryError> {
    let mut snapshot = TemperatureSnapshot::new();
    let mut found = 0usize;
    let mut value: Option<u16> = None;

    for (position, &byte) in payload.iter().enumerate() {
        if byte.is_ascii_digit() {
            let digit = u16::from(byte - b'0');
            let next = value
                .unwrap_or(0)
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or(TelemetryError::ValueOverflow { channel: found })?;
            value = Some(next);
        } else if is_field_separator(byte) {
            snapshot.push(value.take().unwrap_or(0));
            found += 1;
        } else {
            return Err(TelemetryError::InvalidTelemetry { position, byte });
        }
    }

    // Last group needs no trailing separator
    if let Some(closed) = value {
        snapshot.push(closed);
        found += 1;
    }

    if found > POWER_SUPPLY_COUNT {
        return Err(TelemetryError::TooManyChannels { found });
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn values(snapshot: &TemperatureSnapshot) -> Vec<u16, POWER_SUPPLY_COUNT> {
        snapshot.celsius().collect()
    }

    #[test]
    fn test_parse_three_channels() {
        let snapshot = parse(b"45;60;55").unwrap();
        assert_eq!(values(&snapshot).as_slice(), &[45, 60, 55]);
        assert_eq!(snapshot.get(1), Some(TemperatureReading::new(1, 60)));
        assert_eq!(snapshot.get(3), None);
    }

    #[test]
    fn test_parse_digits_are_most_significant_first() {
        let snapshot = parse(b"123;7;0").unwrap();
        assert_eq!(values(&snapshot).as_slice(), &[123, 7, 0]);
    }

    #[test]
    fn test_parse_trailing_separator() {
        let snapshot = parse(b"45;60;").unwrap();
        assert_eq!(values(&snapshot).as_slice(), &[45, 60]);
    }

    #[test]
    fn test_parse_empty_payload() {
        let snapshot = parse(b"").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_parse_empty_group_reads_zero() {
        let snapshot = parse(b"45;;60").unwrap();
        assert_eq!(values(&snapshot).as_slice(), &[45, 0, 60]);

        let snapshot = parse(b";45").unwrap();
        assert_eq!(values(&snapshot).as_slice(), &[0, 45]);

        // Separators only: each one closes an empty reading
        let snapshot = parse(b";;").unwrap();
        assert_eq!(values(&snapshot).as_slice(), &[0, 0]);
    }

    #[test]
    fn test_parse_empty_groups_count_toward_capacity() {
        assert_eq!(
            parse(b";;;;;;;;;;1"),
            Err(TelemetryError::TooManyChannels { found: 11 })
        );
    }

    #[test]
    fn test_parse_invalid_byte() {
        assert_eq!(
            parse(b"45;6a"),
            Err(TelemetryError::InvalidTelemetry {
                position: 4,
                byte: b'a'
            })
        );
    }

    #[test]
    fn test_parse_value_overflow() {
        assert_eq!(
            parse(b"1;70000"),
            Err(TelemetryError::ValueOverflow { channel: 1 })
        );
    }

    #[test]
    fn test_parse_too_many_channels() {
        let result = parse(b"1;2;3;4;5;6;7;8;9;10;11");
        assert_eq!(result, Err(TelemetryError::TooManyChannels { found: 11 }));

        let full = parse(b"1;2;3;4;5;6;7;8;9;10").unwrap();
        assert_eq!(full.len(), POWER_SUPPLY_COUNT);
    }

    #[test]
    fn test_from_celsius() {
        let snapshot = TemperatureSnapshot::from_celsius(&[20, 30]).unwrap();
        assert_eq!(snapshot.readings()[1].channel(), 1);
        assert!(TemperatureSnapshot::from_celsius(&[0; 11]).is_err());
    }

    proptest! {
        #[test]
        fn prop_parse_matches_groups(
            head in proptest::collection::vec(
                proptest::option::of(0u16..1000),
                0..POWER_SUPPLY_COUNT,
            ),
            last in 0u16..1000,
            trailing in any::<bool>(),
        ) {
            // `None` groups are written as empty fields and read back as 0
            let mut groups: Vec<Option<u16>, POWER_SUPPLY_COUNT> = head.iter().copied().collect();
            groups.push(Some(last)).unwrap();

            let mut payload: Vec<u8, 64> = Vec::new();
            for (i, group) in groups.iter().enumerate() {
                if i > 0 {
                    payload.push(b';').unwrap();
                }
                let Some(t) = group else {
                    continue;
                };
                let mut digits = [0u8; 3];
                let mut n = *t;
                let mut len = 0;
                loop {
                    digits[len] = b'0' + (n % 10) as u8;
                    len += 1;
                    n /= 10;
                    if n == 0 {
                        break;
                    }
                }
                for &d in digits[..len].iter().rev() {
                    payload.push(d).unwrap();
                }
            }
            if trailing {
                payload.push(b';').unwrap();
            }

            let snapshot = parse(&payload).unwrap();
            prop_assert_eq!(snapshot.len(), groups.len());
            for (reading, expected) in snapshot.celsius().zip(groups.iter()) {
                prop_assert_eq!(reading, expected.unwrap_or(0));
            }
        }
    }
}
