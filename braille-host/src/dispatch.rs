//! Opcode dispatcher
//!
//! Folds each poll's opcode into the host pipeline's state: the braille
//! grade, the capture trigger, the pending alert and the recalibration
//! timer. The dispatcher decides; the caller carries out the I/O.

use std::sync::Arc;
use std::time::{Duration, Instant};

use braille_protocol::Opcode;

use crate::alert::AlertMailbox;

/// Braille translation grade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grade {
    /// Letter-by-letter
    #[default]
    One,
    /// Contracted, word by word
    Two,
}

/// What the host should do after one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Run the capture pipeline
    Capture,
    /// The grade was set
    GradeChanged(Grade),
    /// Nothing from the unit: deliver a pending alert, recalibrate if due
    Idle {
        /// Alert text taken from the mailbox
        alert: Option<String>,
        /// The recalibration interval has elapsed
        recalibrate: bool,
    },
}

/// Maps opcodes from the unit to host actions
///
/// Holds the translation grade and the recalibration timer; alerts come
/// from the shared mailbox.
pub struct Dispatcher {
    grade: Grade,
    mailbox: Arc<AlertMailbox>,
    recalibrate_after: Duration,
    last_calibration: Instant,
}

impl Dispatcher {
    /// Create a dispatcher at grade 1, counting from a calibration at `now`
    pub fn new(mailbox: Arc<AlertMailbox>, recalibrate_after: Duration, now: Instant) -> Self {
        Self {
            grade: Grade::One,
            mailbox,
            recalibrate_after,
            last_calibration: now,
        }
    }

    /// Grade selected by the last mode opcode
    pub fn grade(&self) -> Grade {
        self.grade
    }

    /// Restart the recalibration timer
    pub fn mark_calibrated(&mut self, now: Instant) {
        self.last_calibration = now;
    }

    /// Apply one opcode
    ///
    /// The mailbox is only read on idle polls, and reading it clears it.
    pub fn dispatch(&mut self, opcode: Opcode, now: Instant) -> Directive {
        match opcode {
            Opcode::Send => Directive::Capture,
            Opcode::Grade2 => {
                self.grade = Grade::Two;
                Directive::GradeChanged(Grade::Two)
            }
            Opcode::Grade1 => {
                self.grade = Grade::One;
                Directive::GradeChanged(Grade::One)
            }
            Opcode::Idle => Directive::Idle {
                alert: self.mailbox.take(),
                recalibrate: now.saturating_duration_since(self.last_calibration)
                    > self.recalibrate_after,
            },
        }
    }
}
