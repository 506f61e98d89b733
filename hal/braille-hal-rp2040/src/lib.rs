//! RP2040-specific HAL for the braille display unit
//!
//! Thin adapters from embassy-rp drivers to the `braille-hal` traits:
//!
//! - Push buttons and the buzzer on GPIO
//! - The host link on a buffered (interrupt-driven) UART

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::{RpInput, RpOutput};
pub use uart::RpUart;
