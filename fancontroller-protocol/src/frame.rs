//! Frame scanning for the serial telemetry protocol
//!
//! Frame format:
//! - START (1 byte): `[` (0x5B)
//! - PAYLOAD (0-64 bytes): command letter or telemetry text
//! - END (1 byte): `]` (0x5D)
//!
//! Bytes outside a frame are discarded. A frame that grows past
//! [`MAX_PAYLOAD_SIZE`] is dropped and the reader goes back to scanning.

use core::fmt;

use heapless::Vec;

use crate::source::{ByteSource, StopSignal};

/// Frame start marker (`[`)
pub const START_MARKER: u8 = 0x5B;

/// Frame end marker (`]`)
pub const END_MARKER: u8 = 0x5D;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 64;

/// Maximum complete frame size (START + MAX_PAYLOAD + END)
pub const MAX_FRAME_SIZE: usize = 1 + MAX_PAYLOAD_SIZE + 1;

/// Errors that can occur while scanning or building frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload reached the maximum length without an end marker
    FrameTooLong,
    /// A start marker arrived inside an open frame; the partial frame was dropped
    UnexpectedStart,
    /// Payload contains a marker byte and cannot be framed
    MarkerInPayload,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::FrameTooLong => {
                write!(f, "frame exceeds {} payload bytes", MAX_PAYLOAD_SIZE)
            }
            FrameError::UnexpectedStart => f.write_str("start marker inside open frame"),
            FrameError::MarkerInPayload => f.write_str("marker byte in payload"),
        }
    }
}

/// Errors returned by the blocking [`FrameReader::read_frame`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadError {
    /// Framing error; the reader has already resynchronized
    Frame(FrameError),
    /// The stop signal was raised between polls
    Stopped,
}

impl From<FrameError> for ReadError {
    fn from(e: FrameError) -> Self {
        ReadError::Frame(e)
    }
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadError::Frame(e) => write!(f, "framing error: {}", e),
            ReadError::Stopped => f.write_str("reader stopped"),
        }
    }
}

/// A received frame, markers excluded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Create a frame from payload bytes
    pub fn new(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.contains(&START_MARKER) || payload.contains(&END_MARKER) {
            return Err(FrameError::MarkerInPayload);
        }

        let payload = Vec::from_slice(payload).map_err(|_| FrameError::FrameTooLong)?;
        Ok(Self { payload })
    }

    /// Payload bytes between the markers
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Check if the payload is empty (`[]`)
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// Framing diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Complete frames produced
    pub frames: u32,
    /// Frames dropped for exceeding the payload limit
    pub too_long: u32,
    /// Partial frames dropped because a new start marker arrived
    pub unexpected_start: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Discarding bytes until a start marker
    Scanning,
    /// Accumulating payload until the end marker
    Collecting,
}

/// Incremental frame scanner
///
/// Bytes can be pushed one at a time with [`feed`](Self::feed), or pulled
/// from a [`ByteSource`] with [`read_frame`](Self::read_frame).
#[derive(Debug, Clone)]
pub struct FrameReader {
    state: ReadState,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
    stats: FrameStats,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Create a new reader in scanning state
    pub const fn new() -> Self {
        Self {
            state: ReadState::Scanning,
            buffer: Vec::new(),
            stats: FrameStats {
                frames: 0,
                too_long: 0,
                unexpected_start: 0,
            },
        }
    }

    /// Drop any partial frame and go back to scanning
    pub fn reset(&mut self) {
        self.state = ReadState::Scanning;
        self.buffer.clear();
    }

    /// Framing counters since creation
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Check if a frame is currently open
    pub fn in_frame(&self) -> bool {
        self.state == ReadState::Collecting
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(frame))` when an end marker closes a frame,
    /// `Ok(None)` when more bytes are needed, or `Err` on a framing error.
    /// The reader is already resynchronized when an error is returned.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            ReadState::Scanning => {
                if byte == START_MARKER {
                    self.buffer.clear();
                    self.state = ReadState::Collecting;
                }
                // Silently ignore everything else while scanning
                Ok(None)
            }
            ReadState::Collecting => {
                if byte == END_MARKER {
                    let frame = Frame {
                        payload: core::mem::take(&mut self.buffer),
                    };
                    self.state = ReadState::Scanning;
                    self.stats.frames = self.stats.frames.wrapping_add(1);
                    return Ok(Some(frame));
                }

                if byte == START_MARKER {
                    // Keep collecting, but for the new frame
                    self.buffer.clear();
                    self.stats.unexpected_start = self.stats.unexpected_start.wrapping_add(1);
                    return Err(FrameError::UnexpectedStart);
                }

                if self.buffer.push(byte).is_err() {
                    // The offending byte is not a start marker (checked above),
                    // so scanning would discard it anyway.
                    self.reset();
                    self.stats.too_long = self.stats.too_long.wrapping_add(1);
                    return Err(FrameError::FrameTooLong);
                }

                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the reader
    ///
    /// Returns the first complete frame found, if any.
    /// Remaining bytes after a complete frame are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Frame>, FrameError> {
        for &byte in bytes {
            if let Some(frame) = self.feed(byte)? {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    /// Poll `source` until a frame completes
    ///
    /// Empty polls keep the scan going; the loop only ends on a frame, a
    /// framing error, or when `stop` is raised. `stop` is checked before
    /// every poll.
    pub fn read_frame<S, T>(
        &mut self,
        source: &mut S,
        stop: &T,
        timeout_us: u32,
    ) -> Result<Frame, ReadError>
    where
        S: ByteSource + ?Sized,
        T: StopSignal + ?Sized,
    {
        loop {
            if stop.is_stopped() {
                return Err(ReadError::Stopped);
            }

            let Some(byte) = source.poll(timeout_us) else {
                continue;
            };

            if let Some(frame) = self.feed(byte)? {
                return Ok(frame);
            }
        }
    }
}
