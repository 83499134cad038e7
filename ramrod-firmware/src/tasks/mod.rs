//! Embassy async tasks
//!
//! Each task owns one subsystem and communicates via the statics in
//! [`crate::channels`].

pub mod battery;
pub mod bridge;
pub mod flywheel;
pub mod trigger;

pub use battery::battery_task;
pub use bridge::bridge_task;
pub use flywheel::flywheel_task;
pub use trigger::{cycle_switch_task, trigger_task};

use embassy_time::Instant;

/// Milliseconds of uptime, wrapped into the controller's clock domain
pub(crate) fn now_ms() -> u32 {
    Instant::now().as_millis() as u32
}
