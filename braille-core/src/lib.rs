//! Board-agnostic core logic for the braille display unit
//!
//! This crate contains everything between the pins/UART and the screen
//! that does not depend on a specific chip:
//!
//! - Line-oriented serial link (shared with the host)
//! - Button debouncing and the persistent mode flag
//! - Receive FIFO with alert pre-emption
//! - Refresh tick generator
//! - Buzzer timing
//! - The display unit's cooperative poll loop
//!
//! Time is passed in as monotonic milliseconds; nothing here reads a clock.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buzzer;
pub mod config;
pub mod fifo;
pub mod input;
pub mod link;
pub mod tick;
pub mod traits;
pub mod unit;

pub use buzzer::Buzzer;
pub use config::{UnitConfig, DEFAULT_FIFO_CAPACITY};
pub use fifo::{FifoError, OverflowPolicy, ReceiveFifo};
pub use input::{Button, ButtonEvents, ButtonPanel, ButtonState, Channel};
pub use link::{Line, LineAssembler, LineOverrun, Link, LinkError, MAX_LINE_LEN};
pub use tick::TickGenerator;
pub use traits::{BrailleDisplay, DisplayError, TimeOfDay};
pub use unit::{DisplayUnit, FifoOverflow, LinkFault, PollReport};
