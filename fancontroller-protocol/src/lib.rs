//! Serial Telemetry Protocol
//!
//! This crate defines the byte-oriented protocol spoken by the test host
//! that reports power-supply temperatures to the cooling controller.
//!
//! # Protocol Overview
//!
//! Every message is a text payload between two markers:
//! ```text
//! ┌───────┬──────────────────────┬─────┐
//! │ [     │ PAYLOAD              │ ]   │
//! │ 0x5B  │ 0–64B                │ 0x5D│
//! └───────┴──────────────────────┴─────┘
//! ```
//!
//! - Command frame: a single ASCII letter, e.g. `[S]` (startup) or `[E]` (end).
//! - Telemetry frame: decimal digit groups split by `;`, e.g. `[45;60;55]`.
//!
//! There is no checksum and no escaping. After a malformed frame the reader
//! simply resynchronizes on the next start marker.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod frame;
pub mod message;
pub mod source;
pub mod telemetry;

pub use frame::{
    Frame, FrameError, FrameReader, FrameStats, ReadError, END_MARKER, MAX_PAYLOAD_SIZE,
    START_MARKER,
};
pub use message::{classify, Command, Message, TelemetryPayload, FIELD_SEPARATORS};
pub use source::{ByteSource, StopSignal};
pub use telemetry::{
    TelemetryError, TemperatureReading, TemperatureSnapshot, POWER_SUPPLY_COUNT,
};
