//! Battery monitor task
//!
//! Polls the pack voltage monitor and publishes the flat-pack state.
//! The monitor rate-limits itself; the task tick only bounds how stale
//! the reading can get.

use core::sync::atomic::Ordering;

use defmt::*;
use embassy_time::{Duration, Ticker};

use ramrod_drivers::battery::BatteryMonitor;

use crate::channels::PACK_FLAT;
use crate::hw::BatterySense;

use super::now_ms;

#[embassy_executor::task]
pub async fn battery_task(mut monitor: BatteryMonitor<BatterySense>) {
    info!("Battery task started: {}S pack", monitor.cells());

    let mut was_flat = false;
    let mut last_percent = 0u8;
    let mut ticker = Ticker::every(Duration::from_millis(100));

    loop {
        monitor.poll(now_ms());

        let flat = monitor.is_flat();
        if flat != was_flat {
            was_flat = flat;
            PACK_FLAT.store(flat, Ordering::Relaxed);
            if flat {
                warn!("Battery flat: {} mV", monitor.voltage_mv().unwrap_or(0));
            } else {
                info!("Battery recovered: {} mV", monitor.voltage_mv().unwrap_or(0));
            }
        }

        let percent = monitor.percent();
        if percent != last_percent && monitor.voltage_mv().is_some() {
            last_percent = percent;
            debug!(
                "Battery at {}% ({} mV)",
                percent,
                monitor.voltage_mv().unwrap_or(0)
            );
        }

        ticker.next().await;
    }
}
