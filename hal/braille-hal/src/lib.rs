//! Braille Link Hardware Abstraction Layer
//!
//! Hardware abstraction traits implemented by chip-specific HALs (RP2040)
//! and by the host-side serial port wrapper. The same link and input code
//! runs unchanged on both ends of the serial cable.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  braille-core (link, debounce, unit loop)    │
//! └──────────────────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────┐
//! │  braille-hal (this crate - traits)           │
//! └──────────────────────────────────────────────┘
//!                       │
//!           ┌───────────┴───────────┐
//!           ▼                       ▼
//! ┌──────────────────┐    ┌──────────────────┐
//! │ braille-hal-     │    │ braille-host     │
//! │    rp2040        │    │  (serialport)    │
//! └──────────────────┘    └──────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`uart::UartTx`], [`uart::UartRx`] - Serial communication

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

pub use gpio::{InputPin, OutputPin};
pub use uart::{UartConfig, UartRx, UartTx};
