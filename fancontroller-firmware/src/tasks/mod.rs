//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod pwm;
pub mod serial_rx;

pub use pwm::pwm_task;
pub use serial_rx::serial_rx_task;
