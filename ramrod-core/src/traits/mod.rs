//! Hardware abstraction traits
//!
//! These traits define the interface between the bridge logic and
//! hardware-specific output implementations.

pub mod output;

pub use output::{PwmOutput, SwitchOutput};
