//! Pusher bridge control task
//!
//! Owns the half-bridge: drains trigger commands and cycle-switch
//! heartbeats, then advances the controller state machine on a 1 ms
//! tick. The tick must stay well inside the configured dead-times, so
//! nothing in this loop is allowed to block.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::{Duration, Ticker};

use ramrod_core::bridge::BridgeController;
use ramrod_core::config::BridgeTimings;
use ramrod_drivers::output::GpioSwitch;

use crate::channels::{BridgeCommand, BRIDGE_CMD, CYCLE_TICK, JAM_LATCHED};
use crate::hw::SlicePwm;

use super::now_ms;

#[embassy_executor::task]
pub async fn bridge_task(run: SlicePwm, brake_pin: Output<'static>, timings: BridgeTimings) {
    info!("Bridge task started");

    let brake = GpioSwitch::new(brake_pin);
    let mut bridge = BridgeController::new(run, brake, timings);
    if let Err(e) = bridge.init() {
        error!("Bridge timings rejected: {:?}; pusher disabled", e);
        return;
    }

    let mut was_jammed = false;
    let mut ticker = Ticker::every(Duration::from_millis(1));

    loop {
        // Check for a new command (non-blocking)
        if let Some(cmd) = BRIDGE_CMD.try_take() {
            match cmd {
                BridgeCommand::Run { speed } => {
                    bridge.set_speed(speed);
                    bridge.request_run(now_ms());
                    debug!("Pusher run at {}%", speed);
                }
                BridgeCommand::Stop => {
                    bridge.request_stop();
                    debug!("Pusher stop");
                }
                BridgeCommand::ResetJam => {
                    bridge.reset_jam();
                    info!("Jam cleared");
                }
            }
        }

        if CYCLE_TICK.try_take().is_some() {
            bridge.heartbeat(now_ms());
        }

        bridge.process(now_ms());

        let jammed = bridge.is_jammed();
        if jammed != was_jammed {
            was_jammed = jammed;
            JAM_LATCHED.store(jammed, Ordering::Relaxed);
            if jammed {
                warn!("Pusher jam detected; drive halted until acknowledged");
            }
        }

        ticker.next().await;
    }
}
