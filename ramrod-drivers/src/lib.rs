//! Peripheral driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in ramrod-core, plus self-contained peripheral drivers:
//!
//! - Output adapters (embedded-hal pins and PWM onto the bridge traits)
//! - Battery pack monitor (moving-average ADC sampling)
//! - Brushless ESC throttle driver

#![no_std]
#![deny(unsafe_code)]

pub mod battery;
pub mod esc;
pub mod output;
