//! Board-agnostic core logic for the Ramrod pusher-drive firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (switch output, duty-cycle output)
//! - Half-bridge controller state machine with dead-time generation
//! - Jam detection and fault latching
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod bridge;
pub mod config;
pub mod traits;
