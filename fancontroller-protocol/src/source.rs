//! Byte input and cancellation abstractions
//!
//! The serial port itself lives outside this crate. The reader only needs
//! something it can poll for single bytes, and something it can ask whether
//! it should give up.

use core::sync::atomic::{AtomicBool, Ordering};

/// Polled source of serial bytes
///
/// Implementations wait at most `timeout_us` microseconds and return `None`
/// when no byte arrived in that window. They must never block indefinitely.
pub trait ByteSource {
    /// Poll for the next byte
    fn poll(&mut self, timeout_us: u32) -> Option<u8>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn poll(&mut self, timeout_us: u32) -> Option<u8> {
        (**self).poll(timeout_us)
    }
}

/// Stop request checked between polls
///
/// Lets the owner of a scan loop interrupt it on a dead input source.
pub trait StopSignal {
    /// Returns true once a stop has been requested
    fn is_stopped(&self) -> bool;
}

impl StopSignal for AtomicBool {
    fn is_stopped(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<T: StopSignal + ?Sized> StopSignal for &T {
    fn is_stopped(&self) -> bool {
        (**self).is_stopped()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_stop_signal() {
        let stop = AtomicBool::new(false);
        assert!(!stop.is_stopped());

        stop.store(true, Ordering::Release);
        assert!(stop.is_stopped());
        assert!((&stop).is_stopped());
    }
}
