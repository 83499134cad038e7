//! Half-bridge control
//!
//! One high-side brake FET, one low-side PWM run FET, and the state
//! machine that guarantees they never conduct at the same time.

mod controller;

pub use controller::BridgeController;

/// Bridge drive states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeState {
    /// Brake engaged, drive output inactive
    Stopped,
    /// Both outputs forced inactive while the dead-time window elapses
    Transitioning,
    /// Drive output active per the requested speed, brake inactive
    Running,
}
