//! Braille Link Serial Protocol
//!
//! This crate defines the line-oriented text protocol spoken between the
//! host (speech and sound recognition) and the display unit (braille grid,
//! buttons, buzzer). Both directions are ASCII lines terminated by `\n`.
//!
//! # Protocol Overview
//!
//! Host → display unit, one data frame per line:
//! ```text
//! ┌────────┬──────────────────────────────────────┬────┐
//! │ HEADER │ BITS                                 │ \n │
//! │ 1 char │ 72 chars: 12 cells × 6 dots, '0'/'1' │    │
//! └────────┴──────────────────────────────────────┴────┘
//! ```
//! Header `0` is ordinary content, `1` is an alert that jumps the queue.
//! Each cell's dots travel in actuator wiring order, see [`frame::WIRE_ORDER`].
//!
//! Display unit → host, one control line per button event: `SEND`, `True`
//! or `False`. The host folds these into a 2-bit [`Opcode`].
//!
//! There is no checksum and no retransmission. Fixed-length framing is the
//! only corruption check.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod cell;
pub mod control;
pub mod frame;

pub use cell::{Cell, Grid, CELL_DOTS, GRID_CELLS, GRID_COLUMNS, GRID_ROWS};
pub use control::{ControlLine, Opcode};
pub use frame::{Frame, FrameError, Priority, DATA_BITS, FRAME_LEN, LINE_LEN, WIRE_ORDER};
