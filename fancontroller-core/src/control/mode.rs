//! Control mode state machine
//!
//! Command frames move the controller between phases. `TestRunning` and the
//! end of `Cooldown` are asserted by the surrounding caller; the controller
//! never enters them on its own.

/// Controller operating phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlMode {
    /// Nothing under test
    #[default]
    Idle,
    /// `S` received, ramping up for a test
    Startup,
    /// Test in progress; bad input biases toward more cooling
    TestRunning,
    /// `E` received, cooling the supplies down
    Cooldown,
}

/// Events that move the control mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ModeEvent {
    /// `S` command
    StartupRequested,
    /// `E` command
    CooldownRequested,
    /// Caller reports that the test is running
    TestStarted,
    /// Caller reports that cooldown is over
    CooldownFinished,
}

impl ControlMode {
    /// Check if a test is running
    pub fn is_test_running(&self) -> bool {
        matches!(self, ControlMode::TestRunning)
    }

    /// Check if the fans are under active control (anything but idle)
    pub fn is_active(&self) -> bool {
        !matches!(self, ControlMode::Idle)
    }

    /// Short label for status output
    pub fn label(&self) -> &'static str {
        match self {
            ControlMode::Idle => "IDLE",
            ControlMode::Startup => "START",
            ControlMode::TestRunning => "TEST",
            ControlMode::Cooldown => "COOL",
        }
    }

    /// Process an event and return the next mode
    pub fn transition(self, event: ModeEvent) -> Self {
        use ControlMode::*;
        use ModeEvent::*;

        match (self, event) {
            // Commands apply from any mode
            (_, StartupRequested) => Startup,
            (_, CooldownRequested) => Cooldown,

            (Idle, TestStarted) | (Startup, TestStarted) => TestRunning,
            (Cooldown, CooldownFinished) => Idle,

            // Default: stay in current mode
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_from_any_mode() {
        let modes = [
            ControlMode::Idle,
            ControlMode::Startup,
            ControlMode::TestRunning,
            ControlMode::Cooldown,
        ];

        for mode in modes {
            assert_eq!(mode.transition(ModeEvent::StartupRequested), ControlMode::Startup);
            assert_eq!(mode.transition(ModeEvent::CooldownRequested), ControlMode::Cooldown);
        }
    }

    #[test]
    fn test_full_cycle() {
        let mode = ControlMode::default();
        assert_eq!(mode, ControlMode::Idle);

        let mode = mode.transition(ModeEvent::StartupRequested);
        let mode = mode.transition(ModeEvent::TestStarted);
        assert!(mode.is_test_running());

        let mode = mode.transition(ModeEvent::CooldownRequested);
        assert_eq!(mode, ControlMode::Cooldown);

        let mode = mode.transition(ModeEvent::CooldownFinished);
        assert_eq!(mode, ControlMode::Idle);
        assert!(!mode.is_active());
    }

    #[test]
    fn test_caller_events_ignored_out_of_place() {
        assert_eq!(
            ControlMode::Cooldown.transition(ModeEvent::TestStarted),
            ControlMode::Cooldown
        );
        assert_eq!(
            ControlMode::TestRunning.transition(ModeEvent::CooldownFinished),
            ControlMode::TestRunning
        );
    }
}
