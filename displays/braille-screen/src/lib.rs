//! Screen rendering for the braille display unit
//!
//! This crate provides:
//! - `Framebuffer`: a 128×64 monochrome buffer in SH1106 page layout that
//!   implements the `embedded-graphics` `DrawTarget`
//! - `BrailleScreen`: the unit's screen layout, implementing
//!   `braille_core::BrailleDisplay`
//!
//! Rendering only touches RAM. The firmware pushes dirty frames to the
//! panel from its poll loop.
//!
//! ```text
//! ┌────────────────────────────┐
//! │ 12:34:56          GRADE 1  │  status line
//! │ ⠿  ⠿  ⠿  ⠿  ⠿  ⠿           │  cells 0..6
//! │ ⠿  ⠿  ⠿  ⠿  ⠿  ⠿           │  cells 6..12
//! └────────────────────────────┘
//! ```

#![no_std]

pub mod framebuffer;
pub mod layout;

pub use framebuffer::{Framebuffer, HEIGHT, PAGES, WIDTH};
pub use layout::BrailleScreen;
