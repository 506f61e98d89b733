//! Host side of the braille display link
//!
//! Listens for control lines from the display unit and answers them:
//!
//! ```text
//!   display unit ──"SEND"/"True"/"False"──▶ Link ─▶ Opcode ─▶ Dispatcher
//!                                                               │
//!        ┌──────────────────────────────┬───────────────────────┤
//!        ▼                              ▼                       ▼
//!   SpeechCapture ─▶ BrailleText    set grade          AlertMailbox (idle)
//!        │                                                      │
//!        └──────── Frame '0' ──▶ Link ◀── Frame '1' ────────────┘
//! ```
//!
//! Alerts come from an external sound classifier through a prediction
//! feed thread; see [`alert`].

pub mod alert;
pub mod app;
pub mod capture;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod serial;
pub mod translate;

pub use alert::{spawn_prediction_feed, AlertMailbox, AlertPolicy, Prediction};
pub use app::{Host, PollOutcome};
pub use capture::{ConsoleCapture, RecognitionError, SpeechCapture};
pub use cli::Cli;
pub use config::{AlertConfig, ConfigError, HostConfig};
pub use dispatch::{Directive, Dispatcher, Grade};
pub use serial::{SerialError, SerialUart};
pub use translate::{Alphabet, BrailleText, Grade1Translator, Grade2Translator};
