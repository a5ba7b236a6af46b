//! Collaborator traits
//!
//! These traits define the interface between the control logic and the
//! board: an indicator output, the fan PWM actuator and a text display.
//! Byte input lives in `fancontroller_protocol::source`.

pub mod display;
pub mod outputs;

pub use display::DisplaySink;
pub use outputs::{IndicatorOutput, PinIndicator, PwmActuator, PwmFan};
