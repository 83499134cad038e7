//! Timing configuration for the bridge state machine

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Maximum label length
pub const MAX_LABEL_LEN: usize = 16;

/// Errors raised by configuration validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Pin number outside the target's GPIO range
    InvalidPin(u8),
    /// The same pin is assigned to more than one output
    PinConflict(u8),
    /// A dead-time of zero would allow both FETs to conduct at once
    ZeroDeadTime,
    /// Jam timeout must exceed both dead-time windows
    CycleTimeTooShort,
}

/// Dead-time and jam-detection timings for one bridge
///
/// The on-transition covers the brake FET's gate discharge before the run
/// FET may switch; the off-transition covers the reverse. `max_cycle_ms`
/// is the longest the mechanism may go without a heartbeat while running
/// before it is considered jammed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BridgeTimings {
    /// Dead-time before enabling drive after a stop->run request (ms)
    pub on_transition_ms: u32,
    /// Dead-time before enabling brake after a run->stop request (ms)
    pub off_transition_ms: u32,
    /// Longest allowed gap between heartbeats while running (ms)
    pub max_cycle_ms: u32,
}

impl BridgeTimings {
    /// Create timings with explicit values
    pub const fn new(on_transition_ms: u32, off_transition_ms: u32, max_cycle_ms: u32) -> Self {
        Self {
            on_transition_ms,
            off_transition_ms,
            max_cycle_ms,
        }
    }

    /// Check the timings for physically sensible values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.on_transition_ms == 0 || self.off_transition_ms == 0 {
            return Err(ConfigError::ZeroDeadTime);
        }

        if self.max_cycle_ms <= self.on_transition_ms || self.max_cycle_ms <= self.off_transition_ms
        {
            return Err(ConfigError::CycleTimeTooShort);
        }

        Ok(())
    }
}

impl Default for BridgeTimings {
    fn default() -> Self {
        Self {
            on_transition_ms: 10,
            off_transition_ms: 2,
            max_cycle_ms: 500,
        }
    }
}
