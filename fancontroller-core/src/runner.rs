//! Blocking control loop
//!
//! Pulls bytes from a [`ByteSource`], runs complete frames through the
//! [`Supervisor`] and pushes the result to the outputs. Used on hosts and in
//! tests; the firmware drives the same pieces from async tasks instead.

use fancontroller_protocol::{ByteSource, FrameReader, FrameStats, ReadError, StopSignal};

use crate::control::{ControlPolicy, PlaceholderPolicy};
use crate::supervisor::{Report, Supervisor};
use crate::traits::{DisplaySink, IndicatorOutput, PwmActuator};

/// Default byte poll timeout (µs)
pub const DEFAULT_POLL_TIMEOUT_US: u32 = 1_000;

/// Frame reader, supervisor and outputs wired together
pub struct ControlLoop<I, A, D, P = PlaceholderPolicy> {
    reader: FrameReader,
    supervisor: Supervisor<P>,
    indicator: I,
    actuator: A,
    display: D,
    poll_timeout_us: u32,
}

impl<I, A, D, P> ControlLoop<I, A, D, P>
where
    I: IndicatorOutput,
    A: PwmActuator,
    D: DisplaySink,
    P: ControlPolicy,
{
    /// Create a loop and push the initial state to the outputs
    pub fn new(supervisor: Supervisor<P>, indicator: I, actuator: A, display: D) -> Self {
        let mut control = Self {
            reader: FrameReader::new(),
            supervisor,
            indicator,
            actuator,
            display,
            poll_timeout_us: DEFAULT_POLL_TIMEOUT_US,
        };

        let controller = control.supervisor.controller();
        let (duty, mode) = (controller.duty(), controller.mode());
        control.actuator.apply(duty);
        control.indicator.set(mode.is_active());
        control
    }

    /// Set the byte poll timeout
    pub fn with_poll_timeout(mut self, timeout_us: u32) -> Self {
        self.poll_timeout_us = timeout_us;
        self
    }

    /// Wrapped supervisor
    pub fn supervisor(&self) -> &Supervisor<P> {
        &self.supervisor
    }

    /// Process the next complete frame
    ///
    /// Framing errors are counted by the reader and skipped. Returns `None`
    /// once `stop` is raised.
    pub fn step<S, T>(&mut self, source: &mut S, stop: &T) -> Option<Report>
    where
        S: ByteSource + ?Sized,
        T: StopSignal + ?Sized,
    {
        loop {
            match self.reader.read_frame(source, stop, self.poll_timeout_us) {
                Ok(frame) => {
                    let report = self.supervisor.handle_frame(&frame);
                    self.publish(&report);
                    return Some(report);
                }
                Err(ReadError::Frame(_)) => continue,
                Err(ReadError::Stopped) => return None,
            }
        }
    }

    /// Process frames until `stop` is raised
    pub fn run<S, T>(&mut self, source: &mut S, stop: &T) -> FrameStats
    where
        S: ByteSource + ?Sized,
        T: StopSignal + ?Sized,
    {
        while self.step(source, stop).is_some() {}
        self.reader.stats()
    }

    fn publish(&mut self, report: &Report) {
        self.actuator.apply(report.duty);
        self.indicator.set(report.mode.is_active());
        self.display.render(report.status_line().as_str());
    }
}
