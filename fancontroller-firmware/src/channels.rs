//! Inter-task communication channels
//!
//! Defines the static signals used between Embassy tasks.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use fancontroller_core::DutyCycle;

/// Latest fan duty cycle (written by the serial RX task, read by the PWM task)
///
/// Only the newest value matters; a duty cycle that is overwritten before
/// the PWM task wakes is never applied.
pub static DUTY_CYCLE: Signal<CriticalSectionRawMutex, DutyCycle> = Signal::new();
