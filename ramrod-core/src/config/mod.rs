//! Configuration types
//!
//! Board-agnostic configuration structures. All values are fixed at
//! build/instantiation time; there is no config parsing or persistence.

pub mod hardware;
pub mod types;

pub use hardware::*;
pub use types::*;
