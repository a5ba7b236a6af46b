//! Telemetry UART receive task
//!
//! Receives frames from the test host and runs them through the supervisor.
//! The resulting duty cycle is handed to the PWM task; the indicator LED and
//! status log are driven from here.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use fancontroller_core::{
    ControlConfig, ControlMode, DisplaySink, DutyCycle, IndicatorOutput, Outcome, PinIndicator,
    Report, Supervisor,
};
use fancontroller_protocol::FrameReader;

use crate::channels::DUTY_CYCLE;
use crate::display::DefmtDisplay;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Serial RX task - receives telemetry and commands from the test host
#[embassy_executor::task]
pub async fn serial_rx_task(
    mut rx: BufferedUartRx,
    led: Output<'static>,
    led_inverted: bool,
    config: ControlConfig,
) {
    info!("Serial RX task started");

    let mut indicator = PinIndicator::new(led, led_inverted);
    let mut display = DefmtDisplay::new();

    let mut supervisor = match Supervisor::with_placeholder_policy(config) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            error!("Invalid controller config: {:?}, running fans at full speed", e);
            DUTY_CYCLE.signal(DutyCycle::FULL);
            return;
        }
    };

    let initial = supervisor.controller().duty();
    DUTY_CYCLE.signal(initial);
    info!("Controller idle, duty {}", initial);

    let mut reader = FrameReader::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let mut mode = ControlMode::Idle;

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match reader.feed(byte) {
                        Ok(Some(frame)) => {
                            let report = supervisor.handle_frame(&frame);
                            log_report(&report, mode);
                            mode = report.mode;

                            DUTY_CYCLE.signal(report.duty);
                            display.render(report.status_line().as_str());

                            let failures = indicator.failures();
                            indicator.set(report.mode.is_active());
                            if indicator.failures() != failures {
                                warn!("Status LED write failed ({} total)", indicator.failures());
                            }
                        }
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            let stats = reader.stats();
                            warn!(
                                "Frame error: {:?} (too long: {}, restarts: {})",
                                e, stats.too_long, stats.unexpected_start
                            );
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

fn log_report(report: &Report, previous: ControlMode) {
    match report.outcome {
        Outcome::Command(command) => debug!("Command: {:?}", command),
        Outcome::Telemetry { readings } => trace!("Telemetry: {} readings", readings),
        Outcome::Rejected { reason, escalated } => {
            if escalated {
                warn!("Rejected frame: {:?}, duty raised to {}", reason, report.duty);
            } else {
                debug!("Rejected frame: {:?}", reason);
            }
        }
    }

    if report.mode != previous {
        info!("Mode: {:?} -> {:?}", previous, report.mode);
    }
}
