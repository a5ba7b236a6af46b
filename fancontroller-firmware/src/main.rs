//! Fancontroller - PSU Cooling Controller Firmware
//!
//! Main firmware binary for RP2040-based boards. A test host streams
//! `[...]`-framed power-supply temperatures and `S`/`E` commands over UART0;
//! the firmware answers with a fan PWM duty cycle.
//!
//! Pin assignment:
//! - GPIO0 / GPIO1: UART0 TX / RX (telemetry link)
//! - GPIO16: fan PWM (slice 0, channel A)
//! - GPIO25: status LED, lit while a test cycle is active

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use fancontroller_core::config::{ControlConfig, Thresholds};

mod channels;
mod display;
mod tasks;

// CONTROL_CONFIG, BAUD_RATE, PWM_TOP, LED_INVERTED from controller.toml
include!(concat!(env!("OUT_DIR"), "/controller_config.rs"));

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Fancontroller firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    info!(
        "Config: duty {}..={}%, step {}%, cutoffs avg>{} max>{} on>={}",
        CONTROL_CONFIG.duty_min,
        CONTROL_CONFIG.duty_max,
        CONTROL_CONFIG.speed_increase,
        CONTROL_CONFIG.thresholds.average_cutoff_c,
        CONTROL_CONFIG.thresholds.single_cutoff_c,
        CONTROL_CONFIG.thresholds.supply_on_c
    );

    // Setup UART for the telemetry link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, rx) = uart.split();

    info!("UART initialized at {} baud", BAUD_RATE);

    // Status LED
    let led = Output::new(p.PIN_25, Level::Low);

    // Fan PWM, starting at 0% duty
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = PWM_TOP;
    pwm_config.compare_a = 0;
    let pwm = Pwm::new_output_a(p.PWM_SLICE0, p.PIN_16, pwm_config);

    let fan_output = match pwm.split() {
        (Some(output), _) => output,
        _ => {
            error!("Fan PWM channel unavailable");
            return;
        }
    };

    info!("Fan PWM initialized (top={})", PWM_TOP);

    spawner.spawn(tasks::pwm_task(fan_output)).unwrap();
    spawner
        .spawn(tasks::serial_rx_task(rx, led, LED_INVERTED, CONTROL_CONFIG))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
