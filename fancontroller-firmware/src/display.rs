//! Status output over the defmt log
//!
//! The board has no screen; status lines go to the RTT log instead.

use defmt::info;

use fancontroller_core::DisplaySink;

/// Display sink that logs each status line
pub struct DefmtDisplay {
    rendered: u32,
}

impl DefmtDisplay {
    /// Create a new log-backed display
    pub const fn new() -> Self {
        Self { rendered: 0 }
    }
}

impl DisplaySink for DefmtDisplay {
    fn render(&mut self, text: &str) {
        self.rendered = self.rendered.wrapping_add(1);
        info!("[{}] {=str}", self.rendered, text);
    }
}
