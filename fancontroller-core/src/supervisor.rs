//! Caller-side supervision of the duty-cycle controller
//!
//! The controller only reacts to frames. Whether a test has actually begun,
//! or whether the supplies have cooled down, is decided here:
//!
//! - telemetry while in `Startup` starts the test
//! - telemetry in `Cooldown` reporting no active supply ends the cooldown
//!
//! Both rules can be switched off in [`ControlConfig`].

use fancontroller_protocol::Frame;

use crate::config::{ConfigError, ControlConfig};
use crate::control::{
    ControlMode, ControlPolicy, DutyCycle, DutyCycleController, Outcome, PlaceholderPolicy,
};
use crate::stats::{AggregateStats, StatsError};
use crate::status::StatusLine;

/// Controller state after one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Report {
    pub outcome: Outcome,
    pub duty: DutyCycle,
    pub mode: ControlMode,
    /// Aggregates over the last known snapshot
    pub stats: Result<AggregateStats, StatsError>,
}

impl Report {
    /// Format the report for a display
    pub fn status_line(&self) -> StatusLine {
        StatusLine::new(self.mode, self.duty, &self.stats)
    }
}

/// Duty-cycle controller plus the test lifecycle rules
pub struct Supervisor<P = PlaceholderPolicy> {
    controller: DutyCycleController<P>,
}

impl Supervisor<PlaceholderPolicy> {
    /// Create a supervisor with the placeholder policy
    pub fn with_placeholder_policy(config: ControlConfig) -> Result<Self, ConfigError> {
        Self::new(config, PlaceholderPolicy)
    }
}

impl<P: ControlPolicy> Supervisor<P> {
    /// Create a supervisor around a new controller
    pub fn new(config: ControlConfig, policy: P) -> Result<Self, ConfigError> {
        Ok(Self {
            controller: DutyCycleController::new(config, policy)?,
        })
    }

    /// Wrapped controller
    pub fn controller(&self) -> &DutyCycleController<P> {
        &self.controller
    }

    /// Current controller state, without a new frame
    pub fn report(&self, outcome: Outcome) -> Report {
        Report {
            outcome,
            duty: self.controller.duty(),
            mode: self.controller.mode(),
            stats: self.controller.last_stats(),
        }
    }

    /// Process one frame and apply the lifecycle rules
    pub fn handle_frame(&mut self, frame: &Frame) -> Report {
        let outcome = self.controller.process_frame(frame);

        if let Outcome::Telemetry { .. } = outcome {
            self.after_telemetry();
        }

        self.report(outcome)
    }

    fn after_telemetry(&mut self) {
        let config = self.controller.config();
        let begin_test = config.begin_test_on_telemetry;
        let finish_cooldown = config.finish_cooldown_when_idle;

        match self.controller.mode() {
            ControlMode::Startup if begin_test => {
                self.controller.begin_test();
            }
            ControlMode::Cooldown if finish_cooldown => {
                // An empty snapshot says nothing about the supplies
                if let Ok(stats) = self.controller.last_stats() {
                    if stats.active_count() == 0 {
                        self.controller.finish_cooldown();
                    }
                }
            }
            _ => {}
        }
    }
}
