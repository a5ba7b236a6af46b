//! Board-agnostic core logic for the PSU cooling controller
//!
//! This crate contains all decision logic that does not depend on
//! specific hardware implementations:
//!
//! - Collaborator traits (indicator, PWM actuator, display sink)
//! - Temperature aggregation (average, maximum, active supplies)
//! - Duty-cycle state machine and pluggable control policy
//! - Caller-side supervision and a blocking control loop
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod config;
pub mod control;
pub mod runner;
pub mod stats;
pub mod status;
pub mod supervisor;
pub mod traits;

pub use config::{ConfigError, ControlConfig, Thresholds};
pub use control::{
    clamp, increase_pwm_speed, ControlMode, ControlPolicy, DutyBounds, DutyCycle,
    DutyCycleController, Outcome, PlaceholderPolicy, RejectReason,
};
pub use runner::{ControlLoop, DEFAULT_POLL_TIMEOUT_US};
pub use stats::{AggregateStats, StatsError};
pub use status::StatusLine;
pub use supervisor::{Report, Supervisor};
pub use traits::{DisplaySink, IndicatorOutput, PinIndicator, PwmActuator, PwmFan};
