//! Inter-task communication channels
//!
//! Defines the static signals used for communication between Embassy
//! tasks. Signals carry latest-value semantics, which is what every
//! consumer here wants; the two latched states are plain atomics since
//! readers only ever need the current value.

use core::sync::atomic::AtomicBool;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// Bridge commands from the trigger task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeCommand {
    /// Run the pusher at the given duty percent
    Run { speed: u8 },
    /// Stop the pusher (brake engages after dead-time)
    Stop,
    /// Acknowledge and clear a latched jam
    ResetJam,
}

/// Bridge command signal (updated by the trigger task)
pub static BRIDGE_CMD: Signal<CriticalSectionRawMutex, BridgeCommand> = Signal::new();

/// One pulse per completed pusher stroke (cycle switch closing)
pub static CYCLE_TICK: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Flywheel throttle percent (updated by the trigger task)
pub static FLYWHEEL_CMD: Signal<CriticalSectionRawMutex, u8> = Signal::new();

/// Latched jam state (published by the bridge task)
pub static JAM_LATCHED: AtomicBool = AtomicBool::new(false);

/// Flat-pack state (published by the battery task)
pub static PACK_FLAT: AtomicBool = AtomicBool::new(false);
