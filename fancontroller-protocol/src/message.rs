//! Frame classification
//!
//! A frame with a single ASCII letter is a command. Anything else is a
//! telemetry candidate that must consist of digits and field separators only.

use crate::frame::Frame;
use crate::telemetry::{self, TelemetryError, TemperatureSnapshot};

/// Bytes that split telemetry fields
pub const FIELD_SEPARATORS: &[u8] = &[b';'];

// Wire format values
const COMMAND_STARTUP: u8 = b'S';
const COMMAND_END: u8 = b'E';

/// Check if a byte is one of the recognized field separators
pub fn is_field_separator(byte: u8) -> bool {
    FIELD_SEPARATORS.contains(&byte)
}

/// Commands sent by the test host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// `S`: a test is about to start
    Startup,
    /// `E`: the test ended, cool the supplies down
    Cooldown,
    /// Any other single letter
    Unrecognized(u8),
}

impl Command {
    /// Parse a command from its letter, `None` if the byte is not a letter
    pub fn from_letter(byte: u8) -> Option<Self> {
        match byte {
            COMMAND_STARTUP => Some(Command::Startup),
            COMMAND_END => Some(Command::Cooldown),
            b if b.is_ascii_alphabetic() => Some(Command::Unrecognized(b)),
            _ => None,
        }
    }
}

/// Telemetry payload that passed byte validation
///
/// Only [`classify`] can build one, so decoding never sees foreign bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryPayload<'a> {
    bytes: &'a [u8],
}

impl<'a> TelemetryPayload<'a> {
    /// Raw payload bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Decode the readings
    pub fn parse(&self) -> Result<TemperatureSnapshot, TelemetryError> {
        telemetry::parse(self.bytes)
    }
}

/// A classified frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message<'a> {
    /// Single-letter command frame
    Command(Command),
    /// Digit/separator telemetry frame
    Telemetry(TelemetryPayload<'a>),
}

/// Classify a frame as command or telemetry
///
/// Fails with [`TelemetryError::InvalidTelemetry`] when a non-command frame
/// contains anything other than digits and field separators.
pub fn classify(frame: &Frame) -> Result<Message<'_>, TelemetryError> {
    let payload = frame.payload();

    if let [byte] = payload {
        if let Some(command) = Command::from_letter(*byte) {
            return Ok(Message::Command(command));
        }
    }

    if let Some(position) = payload
        .iter()
        .position(|&b| !b.is_ascii_digit() && !is_field_separator(b))
    {
        return Err(TelemetryError::InvalidTelemetry {
            position,
            byte: payload[position],
        });
    }

    Ok(Message::Telemetry(TelemetryPayload { bytes: payload }))
}
