//! Flywheel ESC task
//!
//! Arms the ESC at minimum pulse, then applies throttle commands from
//! the trigger task.

use defmt::*;
use embassy_time::{Duration, Timer};

use ramrod_drivers::esc::{Esc, EscConfig};

use crate::channels::FLYWHEEL_CMD;
use crate::hw::SlicePwm;

/// How long the ESC needs a held minimum pulse before it arms
const ARM_HOLD_MS: u64 = 3_000;

#[embassy_executor::task]
pub async fn flywheel_task(pwm: SlicePwm) {
    info!("Flywheel task started");

    let mut esc = Esc::new(pwm, EscConfig::default());

    let _ = esc.arm();
    Timer::after(Duration::from_millis(ARM_HOLD_MS)).await;
    info!("ESC armed");

    loop {
        let throttle = FLYWHEEL_CMD.wait().await;
        let _ = esc.set_throttle_percent(throttle);
        debug!("Flywheel throttle {}%", throttle);
    }
}
