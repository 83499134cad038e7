//! Ramrod - Pusher Drive Firmware
//!
//! Main firmware binary for RP2040-based pusher boards. Validates the
//! board pin map, binds the half-bridge and its peripherals, and spawns
//! one task per subsystem.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{Adc, Channel as AdcChannel, Config as AdcConfig};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Delay;
use fixed::traits::ToFixed;
use {defmt_rtt as _, panic_probe as _};

use ramrod_core::config::{BoardConfig, BridgeHwConfig, BridgeTimings, PinConfig};
use ramrod_drivers::battery::{BatteryConfig, BatteryMonitor};

use crate::hw::{BatterySense, ChannelHalf, SlicePwm};

mod channels;
mod hw;
mod tasks;

/// Pusher PWM top: 20 kHz at the 125 MHz system clock
const PUSHER_PWM_TOP: u16 = 6_249;

/// ESC frame: divider 40 gives a 320 ns tick, so top 62499 is 20 ms (50 Hz)
const ESC_PWM_TOP: u16 = 62_499;
const ESC_PWM_DIVIDER: u8 = 40;

/// Reference board wiring
///
/// The peripheral bindings in [`main`] must match this map; validation
/// catches range errors and collisions before anything is energised.
fn board_config() -> BoardConfig {
    BoardConfig {
        bridge: BridgeHwConfig::new("pusher", PinConfig::new(5), PinConfig::new(15)),
        battery_pin: Some(PinConfig::new(26)),
        esc_pin: Some(PinConfig::new(9)),
        trigger_pin: Some(PinConfig::with_pullup(14)),
        cycle_pin: Some(PinConfig::with_pullup(16)),
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Ramrod firmware starting...");

    let p = embassy_rp::init(Default::default());

    let board = board_config();
    if let Err(e) = board.validate() {
        // Nothing can be trusted with a bad pin map; leave every output unbound.
        error!("Invalid board pin map: {:?}", e);
        return;
    }

    // Pusher bridge: PWM slice for the run FET gate, plain GPIO for the
    // brake FET driver. GPIO5 is channel B of slice 2.
    let mut run_config = PwmConfig::default();
    run_config.top = PUSHER_PWM_TOP;
    run_config.compare_b = 0;
    let run_pwm = Pwm::new_output_b(p.PWM_SLICE2, p.PIN_5, run_config.clone());
    let run = SlicePwm::new(run_pwm, run_config, ChannelHalf::B);
    let brake = Output::new(p.PIN_15, Level::Low);

    // Flywheel ESC on GPIO9 (channel B of slice 4), 50 Hz servo frame.
    let mut esc_config = PwmConfig::default();
    esc_config.divider = ESC_PWM_DIVIDER.to_fixed();
    esc_config.top = ESC_PWM_TOP;
    esc_config.compare_b = 0;
    let esc_pwm = Pwm::new_output_b(p.PWM_SLICE4, p.PIN_9, esc_config.clone());
    let esc = SlicePwm::new(esc_pwm, esc_config, ChannelHalf::B);

    // Battery sense behind the 47k/10k divider on GPIO26.
    let adc = Adc::new_blocking(p.ADC, AdcConfig::default());
    let adc_channel = AdcChannel::new_pin(p.PIN_26, Pull::None);
    let mut battery = BatteryMonitor::new(
        BatterySense::new(adc, adc_channel),
        BatteryConfig {
            vref_mv: 3_300,
            adc_full_scale: 4_096,
            ..BatteryConfig::default()
        },
    );

    // Blocking auto-detect is fine here: no drive task exists yet.
    battery.detect_cells(&mut Delay);
    info!("Detected {}S pack", battery.cells());

    let trigger = Input::new(p.PIN_14, Pull::Up);
    let cycle = Input::new(p.PIN_16, Pull::Up);

    spawner
        .spawn(tasks::bridge_task(run, brake, BridgeTimings::default()))
        .unwrap();
    spawner.spawn(tasks::flywheel_task(esc)).unwrap();
    spawner.spawn(tasks::battery_task(battery)).unwrap();
    spawner.spawn(tasks::trigger_task(trigger)).unwrap();
    spawner.spawn(tasks::cycle_switch_task(cycle)).unwrap();

    info!("All tasks spawned, firmware running");
}
