//! Duty-cycle controller
//!
//! Consumes classified frames and produces the next fan duty cycle.
//!
//! | Input                          | Mode          | Effect                              |
//! |--------------------------------|---------------|-------------------------------------|
//! | `S`                            | any           | → `Startup`, startup policy         |
//! | `E`                            | any           | → `Cooldown`, cooldown policy       |
//! | unknown letter / bad telemetry | `TestRunning` | speed increase                      |
//! | valid telemetry                | any           | replaces last snapshot, determine   |

use fancontroller_protocol::{
    classify, Command, Frame, Message, TelemetryError, TemperatureSnapshot,
};

use super::duty::{DutyBounds, DutyCycle};
use super::mode::{ControlMode, ModeEvent};
use super::policy::{ControlPolicy, PlaceholderPolicy};
use crate::config::{ConfigError, ControlConfig};
use crate::stats::{AggregateStats, StatsError};

/// Why a frame was not used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RejectReason {
    /// Telemetry failed validation or decoding
    InvalidTelemetry(TelemetryError),
    /// Telemetry carried more readings than supported
    TooManyChannels { found: usize },
    /// Single letter that is not a known command
    UnrecognizedCommand(u8),
}

impl From<TelemetryError> for RejectReason {
    fn from(e: TelemetryError) -> Self {
        match e {
            TelemetryError::TooManyChannels { found } => RejectReason::TooManyChannels { found },
            other => RejectReason::InvalidTelemetry(other),
        }
    }
}

/// What the controller did with one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// A recognized command was applied
    Command(Command),
    /// A telemetry snapshot replaced the last known one
    Telemetry { readings: usize },
    /// The frame was rejected; `escalated` is true if the speed was increased
    Rejected { reason: RejectReason, escalated: bool },
}

/// Conservative response to unusable input during a test
///
/// Adds `speed_increase` to the current duty, plus `speed_increase` once
/// more if the last snapshot's hottest supply is above the single cutoff or,
/// failing that, its mean is above the average cutoff. With no last
/// snapshot only the base increase applies. The result is clamped to
/// `bounds`.
pub fn increase_pwm_speed(
    current: DutyCycle,
    last: &TemperatureSnapshot,
    config: &ControlConfig,
    bounds: DutyBounds,
) -> DutyCycle {
    let step = i32::from(config.speed_increase);
    let mut next = i32::from(current.percent()) + step;

    match AggregateStats::from_snapshot(last, &config.thresholds) {
        Ok(stats) => {
            if config.thresholds.max_exceeds_cutoff(stats.max())
                || config.thresholds.average_exceeds_cutoff(&stats)
            {
                next += step;
            }
        }
        Err(StatsError::EmptySnapshot) => {
            // Nothing known about the supplies yet
        }
    }

    DutyCycle::clamped(next, bounds)
}

/// Controller owning the duty cycle, control mode and last known snapshot
pub struct DutyCycleController<P = PlaceholderPolicy> {
    config: ControlConfig,
    bounds: DutyBounds,
    policy: P,
    duty: DutyCycle,
    mode: ControlMode,
    last: TemperatureSnapshot,
}

impl DutyCycleController<PlaceholderPolicy> {
    /// Create a controller with the placeholder policy
    pub fn with_placeholder_policy(config: ControlConfig) -> Result<Self, ConfigError> {
        Self::new(config, PlaceholderPolicy)
    }
}

impl<P: ControlPolicy> DutyCycleController<P> {
    /// Create a controller in `Idle` at the lowest allowed duty cycle
    pub fn new(config: ControlConfig, policy: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let bounds = DutyBounds::from_config(&config)?;

        Ok(Self {
            config,
            bounds,
            policy,
            duty: bounds.low(),
            mode: ControlMode::Idle,
            last: TemperatureSnapshot::new(),
        })
    }

    /// Current duty cycle
    pub fn duty(&self) -> DutyCycle {
        self.duty
    }

    /// Current control mode
    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    /// Last known snapshot (empty until the first telemetry frame)
    pub fn last_snapshot(&self) -> &TemperatureSnapshot {
        &self.last
    }

    /// Aggregates over the last known snapshot
    pub fn last_stats(&self) -> Result<AggregateStats, StatsError> {
        AggregateStats::from_snapshot(&self.last, &self.config.thresholds)
    }

    /// Active configuration
    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Installed policy
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Classify a frame and dispatch it
    pub fn process_frame(&mut self, frame: &Frame) -> Outcome {
        let message = match classify(frame) {
            Ok(message) => message,
            Err(e) => return self.handle_rejected(e.into()),
        };

        match message {
            Message::Command(command) => self.handle_command(command),
            Message::Telemetry(payload) => match payload.parse() {
                Ok(snapshot) => self.handle_telemetry(snapshot),
                Err(e) => self.handle_rejected(e.into()),
            },
        }
    }

    /// Apply a command frame
    pub fn handle_command(&mut self, command: Command) -> Outcome {
        match command {
            Command::Startup => {
                self.apply(ModeEvent::StartupRequested);
                let next = self.policy.startup(self.duty);
                self.set_duty(next);
            }
            Command::Cooldown => {
                self.apply(ModeEvent::CooldownRequested);
                let next = self.policy.cooldown(self.duty, &self.last);
                self.set_duty(next);
            }
            Command::Unrecognized(letter) => {
                return self.handle_rejected(RejectReason::UnrecognizedCommand(letter));
            }
        }

        Outcome::Command(command)
    }

    /// Take a fresh snapshot as the last known one
    pub fn handle_telemetry(&mut self, snapshot: TemperatureSnapshot) -> Outcome {
        let validity = self.policy.check_validity(&snapshot);
        let next = self
            .policy
            .determine(validity, &snapshot, &self.last, self.duty);
        self.set_duty(next);

        let readings = snapshot.len();
        self.last = snapshot;

        Outcome::Telemetry { readings }
    }

    /// Respond to an unusable frame
    ///
    /// Only a running test escalates the fan speed; otherwise the frame is
    /// dropped.
    pub fn handle_rejected(&mut self, reason: RejectReason) -> Outcome {
        let escalated = self.mode.is_test_running();
        if escalated {
            self.duty = increase_pwm_speed(self.duty, &self.last, &self.config, self.bounds);
        }

        Outcome::Rejected { reason, escalated }
    }

    /// Caller asserts that the test is running
    ///
    /// Returns true if the mode changed.
    pub fn begin_test(&mut self) -> bool {
        self.apply(ModeEvent::TestStarted)
    }

    /// Caller asserts that cooldown is complete
    ///
    /// Returns true if the mode changed.
    pub fn finish_cooldown(&mut self) -> bool {
        self.apply(ModeEvent::CooldownFinished)
    }

    fn apply(&mut self, event: ModeEvent) -> bool {
        let next = self.mode.transition(event);
        let changed = next != self.mode;
        self.mode = next;
        changed
    }

    fn set_duty(&mut self, duty: DutyCycle) {
        self.duty = DutyCycle::clamped(i32::from(duty.percent()), self.bounds);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snapshot(values: &[u16]) -> TemperatureSnapshot {
        TemperatureSnapshot::from_celsius(values).unwrap()
    }

    fn duty(percent: u8) -> DutyCycle {
        DutyCycle::new(percent).unwrap()
    }

    fn frame(payload: &[u8]) -> Frame {
        Frame::new(payload).unwrap()
    }

    /// Policy with fixed outputs, to observe clamping and call order
    struct FixedPolicy {
        startup: u8,
        determine: u8,
        determine_calls: u32,
    }

    impl ControlPolicy for FixedPolicy {
        fn startup(&mut self, _current: DutyCycle) -> DutyCycle {
            duty(self.startup)
        }

        fn determine(
            &mut self,
            _validity: crate::control::DataValidity,
            _snapshot: &TemperatureSnapshot,
            _previous: &TemperatureSnapshot,
            _current: DutyCycle,
        ) -> DutyCycle {
            self.determine_calls += 1;
            duty(self.determine)
        }
    }

    fn running_controller(current: u8, last: &[u16]) -> DutyCycleController {
        let mut controller =
            DutyCycleController::with_placeholder_policy(ControlConfig::default()).unwrap();
        controller.handle_command(Command::Startup);
        controller.begin_test();
        controller.handle_telemetry(snapshot(last));
        controller.duty = duty(current);
        controller
    }

    #[test]
    fn test_initial_state() {
        let controller =
            DutyCycleController::with_placeholder_policy(ControlConfig::default()).unwrap();
        assert_eq!(controller.mode(), ControlMode::Idle);
        assert_eq!(controller.duty(), DutyCycle::OFF);
        assert!(controller.last_snapshot().is_empty());
        assert_eq!(controller.last_stats(), Err(StatsError::EmptySnapshot));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = ControlConfig {
            duty_min: 90,
            duty_max: 10,
            ..ControlConfig::DEFAULT
        };
        assert!(DutyCycleController::with_placeholder_policy(config).is_err());
    }

    #[test]
    fn test_startup_command_frame() {
        let mut controller =
            DutyCycleController::with_placeholder_policy(ControlConfig::default()).unwrap();
        let outcome = controller.process_frame(&frame(b"S"));

        assert_eq!(outcome, Outcome::Command(Command::Startup));
        assert_eq!(controller.mode(), ControlMode::Startup);
    }

    #[test]
    fn test_end_command_enters_cooldown() {
        let mut controller = running_controller(40, &[50]);
        controller.process_frame(&frame(b"E"));
        assert_eq!(controller.mode(), ControlMode::Cooldown);
        assert_eq!(controller.duty(), duty(40));
    }

    #[test]
    fn test_telemetry_replaces_last_snapshot() {
        let mut controller =
            DutyCycleController::with_placeholder_policy(ControlConfig::default()).unwrap();
        let outcome = controller.process_frame(&frame(b"45;60;55"));

        assert_eq!(outcome, Outcome::Telemetry { readings: 3 });
        assert_eq!(controller.last_snapshot(), &snapshot(&[45, 60, 55]));
        assert_eq!(controller.last_stats().unwrap().max(), 60);
        // Telemetry alone never changes the mode
        assert_eq!(controller.mode(), ControlMode::Idle);
    }

    #[test]
    fn test_increase_on_max_temperature() {
        // 75 > 70 → base step plus extra step
        let mut controller = running_controller(50, &[75]);
        let outcome = controller.process_frame(&frame(b"x"));

        assert_eq!(
            outcome,
            Outcome::Rejected {
                reason: RejectReason::UnrecognizedCommand(b'x'),
                escalated: true
            }
        );
        assert_eq!(controller.duty(), duty(70));
    }

    #[test]
    fn test_increase_on_average_clamps_to_full() {
        // 65 > 60 → extra step, 95 + 20 capped at 100
        let mut controller = running_controller(95, &[65]);
        controller.process_frame(&frame(b"q"));
        assert_eq!(controller.duty(), DutyCycle::FULL);
    }

    #[test]
    fn test_invalid_telemetry_escalates_like_unknown_command() {
        let mut controller = running_controller(50, &[75]);
        let outcome = controller.process_frame(&frame(b"45;6a"));

        assert!(matches!(
            outcome,
            Outcome::Rejected {
                reason: RejectReason::InvalidTelemetry(TelemetryError::InvalidTelemetry { .. }),
                escalated: true
            }
        ));
        assert_eq!(controller.duty(), duty(70));
        // Rejected frames do not replace the last snapshot
        assert_eq!(controller.last_snapshot(), &snapshot(&[75]));
    }

    #[test]
    fn test_too_many_channels_rejected() {
        let mut controller = running_controller(10, &[30]);
        let outcome = controller.process_frame(&frame(b"1;2;3;4;5;6;7;8;9;10;11"));

        assert_eq!(
            outcome,
            Outcome::Rejected {
                reason: RejectReason::TooManyChannels { found: 11 },
                escalated: true
            }
        );
        assert_eq!(controller.duty(), duty(20));
    }

    #[test]
    fn test_no_escalation_outside_test() {
        let mut controller =
            DutyCycleController::with_placeholder_policy(ControlConfig::default()).unwrap();
        controller.handle_command(Command::Startup);
        let outcome = controller.process_frame(&frame(b"45;6a"));

        assert!(matches!(outcome, Outcome::Rejected { escalated: false, .. }));
        assert_eq!(controller.duty(), DutyCycle::OFF);
    }

    #[test]
    fn test_increase_with_cool_snapshot() {
        let config = ControlConfig::default();
        let last = snapshot(&[40, 50]);
        let next = increase_pwm_speed(duty(30), &last, &config, DutyBounds::FULL_RANGE);
        assert_eq!(next, duty(40));
    }

    #[test]
    fn test_increase_with_empty_snapshot() {
        let config = ControlConfig::default();
        let last = TemperatureSnapshot::new();
        let next = increase_pwm_speed(duty(30), &last, &config, DutyBounds::FULL_RANGE);
        assert_eq!(next, duty(40));
    }

    #[test]
    fn test_policy_output_is_clamped() {
        let config = ControlConfig {
            duty_min: 20,
            duty_max: 80,
            ..ControlConfig::DEFAULT
        };
        let policy = FixedPolicy {
            startup: 100,
            determine: 5,
            determine_calls: 0,
        };
        let mut controller = DutyCycleController::new(config, policy).unwrap();
        assert_eq!(controller.duty(), duty(20));

        controller.handle_command(Command::Startup);
        assert_eq!(controller.duty(), duty(80));

        controller.handle_telemetry(snapshot(&[30]));
        assert_eq!(controller.duty(), duty(20));
        assert_eq!(controller.policy().determine_calls, 1);
    }

    #[test]
    fn test_caller_transitions() {
        let mut controller =
            DutyCycleController::with_placeholder_policy(ControlConfig::default()).unwrap();
        controller.handle_command(Command::Startup);
        assert!(controller.begin_test());
        assert!(!controller.begin_test());
        assert!(!controller.finish_cooldown());

        controller.handle_command(Command::Cooldown);
        assert!(controller.finish_cooldown());
        assert_eq!(controller.mode(), ControlMode::Idle);
    }

    proptest! {
        #[test]
        fn prop_increase_bounds(
            current in 0u8..=100,
            temps in proptest::collection::vec(0u16..150, 0..=10),
        ) {
            let config = ControlConfig::default();
            let last = TemperatureSnapshot::from_celsius(&temps).unwrap();
            let next = increase_pwm_speed(duty(current), &last, &config, DutyBounds::FULL_RANGE);

            let low = (u16::from(current) + 10).min(100) as u8;
            let high = (u16::from(current) + 30).min(100) as u8;
            prop_assert!(next.percent() >= low);
            prop_assert!(next.percent() <= high);
        }

        #[test]
        fn prop_duty_stays_within_configured_bounds(
            startup in 0u8..=100,
            determine in 0u8..=100,
            events in proptest::collection::vec(0u8..8, 0..64),
        ) {
            let config = ControlConfig {
                duty_min: 20,
                duty_max: 80,
                ..ControlConfig::DEFAULT
            };
            let policy = FixedPolicy {
                startup,
                determine,
                determine_calls: 0,
            };
            let mut controller = DutyCycleController::new(config, policy).unwrap();
            let bounds = DutyBounds::new(20, 80).unwrap();
            prop_assert_eq!(controller.duty(), bounds.low());

            for event in events {
                match event {
                    0 => { controller.process_frame(&frame(b"S")); }
                    1 => { controller.process_frame(&frame(b"E")); }
                    2 => { controller.process_frame(&frame(b"80;90")); }
                    3 => { controller.process_frame(&frame(b"z")); }
                    4 => { controller.process_frame(&frame(b"45;6a")); }
                    5 => { controller.process_frame(&frame(b"1;2;3;4;5;6;7;8;9;10;11")); }
                    6 => { controller.begin_test(); }
                    _ => { controller.finish_cooldown(); }
                }
                prop_assert!(controller.duty() >= bounds.low());
                prop_assert!(controller.duty() <= bounds.high());
            }
        }
    }
}
