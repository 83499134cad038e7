//! Trigger and cycle-switch input tasks
//!
//! Both switches are wired to ground with internal pull-ups, so a press
//! is a falling edge. The cycle switch closes once per pusher stroke and
//! feeds the jam-detection heartbeat.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::{Duration, Timer};

use crate::channels::{
    BridgeCommand, BRIDGE_CMD, CYCLE_TICK, FLYWHEEL_CMD, JAM_LATCHED, PACK_FLAT,
};

/// Pusher duty while the trigger is held
const PUSHER_SPEED_PERCENT: u8 = 100;

/// Flywheel throttle while the trigger is held
const FLYWHEEL_THROTTLE_PERCENT: u8 = 80;

/// Contact settle time for both switches
const DEBOUNCE_MS: u64 = 5;

#[embassy_executor::task]
pub async fn trigger_task(mut trigger: Input<'static>) {
    info!("Trigger task started");

    loop {
        trigger.wait_for_falling_edge().await;
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
        if trigger.is_high() {
            // Contact bounce
            continue;
        }

        if JAM_LATCHED.load(Ordering::Relaxed) {
            // A pull while jammed acknowledges the fault; the next pull
            // runs again.
            info!("Trigger pull acknowledges jam");
            BRIDGE_CMD.signal(BridgeCommand::ResetJam);
        } else if PACK_FLAT.load(Ordering::Relaxed) {
            warn!("Trigger ignored: battery flat");
        } else {
            BRIDGE_CMD.signal(BridgeCommand::Run {
                speed: PUSHER_SPEED_PERCENT,
            });
            FLYWHEEL_CMD.signal(FLYWHEEL_THROTTLE_PERCENT);
        }

        trigger.wait_for_rising_edge().await;
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
        BRIDGE_CMD.signal(BridgeCommand::Stop);
        FLYWHEEL_CMD.signal(0);
    }
}

#[embassy_executor::task]
pub async fn cycle_switch_task(mut cycle: Input<'static>) {
    info!("Cycle switch task started");

    loop {
        cycle.wait_for_falling_edge().await;
        CYCLE_TICK.signal(());
        Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
    }
}
