//! Fan PWM task
//!
//! Waits for duty-cycle updates and writes them to the fan PWM channel.

use defmt::*;
use embassy_rp::pwm::PwmOutput;

use fancontroller_core::{PwmActuator, PwmFan};

use crate::channels::DUTY_CYCLE;

/// Fan PWM task
///
/// The fans start stopped and follow the latest signalled duty cycle.
#[embassy_executor::task]
pub async fn pwm_task(output: PwmOutput<'static>) {
    info!("PWM task started");

    let mut fan = PwmFan::new(output);

    loop {
        let duty = DUTY_CYCLE.wait().await;
        if duty != fan.applied() {
            debug!("Fan duty: {} -> {}", fan.applied(), duty);
        }
        fan.apply(duty);

        if fan.applied() != duty {
            warn!("Failed to set fan duty {}", duty);
        }
    }
}
