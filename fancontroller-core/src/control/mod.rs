//! Duty-cycle control
//!
//! The controller owns the fan duty cycle, the control mode and the last
//! known temperature snapshot. Every duty-cycle mutation goes through
//! [`clamp`].

pub mod clamp;
pub mod controller;
pub mod duty;
pub mod mode;
pub mod policy;

pub use clamp::clamp;
pub use controller::{increase_pwm_speed, DutyCycleController, Outcome, RejectReason};
pub use duty::{DutyBounds, DutyCycle};
pub use mode::{ControlMode, ModeEvent};
pub use policy::{ControlPolicy, DataValidity, PlaceholderPolicy};
