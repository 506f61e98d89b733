//! Collaborator traits
//!
//! Implemented outside this crate by whatever draws the screen.

pub mod display;

pub use display::{BrailleDisplay, DisplayError, TimeOfDay};
