//! Control lines from the display unit and the host-side opcode.
//!
//! The display unit reports button activity as short literal lines. The host
//! polls for at most one line per cycle and folds it into a 2-bit opcode;
//! no line, or any unrecognised line, means idle.

/// Control lines sent by the display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlLine {
    /// Push-to-talk pressed
    Send,
    /// Mode flag toggled on (grade 2)
    Grade2,
    /// Mode flag toggled off (grade 1)
    Grade1,
}

// Wire format values
const LINE_SEND: &str = "SEND";
const LINE_GRADE2: &str = "True";
const LINE_GRADE1: &str = "False";

impl ControlLine {
    /// Control line announcing the new mode flag value
    pub fn from_mode(grade2: bool) -> Self {
        if grade2 {
            ControlLine::Grade2
        } else {
            ControlLine::Grade1
        }
    }

    /// Parse a line (terminator already removed)
    ///
    /// Matching is exact and case-sensitive.
    pub fn parse(line: &str) -> Option<Self> {
        match line {
            LINE_SEND => Some(ControlLine::Send),
            LINE_GRADE2 => Some(ControlLine::Grade2),
            LINE_GRADE1 => Some(ControlLine::Grade1),
            _ => None,
        }
    }

    /// Wire text, without terminator
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlLine::Send => LINE_SEND,
            ControlLine::Grade2 => LINE_GRADE2,
            ControlLine::Grade1 => LINE_GRADE1,
        }
    }
}

/// 2-bit control code driving the host pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Opcode {
    /// `00`: nothing from the unit this poll
    #[default]
    Idle,
    /// `01`: start a capture
    Send,
    /// `10`: switch to grade 2
    Grade2,
    /// `11`: switch to grade 1
    Grade1,
}

impl Opcode {
    /// Decode the last line read from the link
    ///
    /// Anything that is not a known control line is idle, never an error.
    pub fn from_line(line: &str) -> Self {
        ControlLine::parse(line).map_or(Opcode::Idle, Opcode::from)
    }

    /// The opcode as two bits
    pub fn bits(self) -> u8 {
        match self {
            Opcode::Idle => 0b00,
            Opcode::Send => 0b01,
            Opcode::Grade2 => 0b10,
            Opcode::Grade1 => 0b11,
        }
    }

    /// The opcode as its two-character bit string
    pub fn as_str(self) -> &'static str {
        match self {
            Opcode::Idle => "00",
            Opcode::Send => "01",
            Opcode::Grade2 => "10",
            Opcode::Grade1 => "11",
        }
    }
}

impl From<ControlLine> for Opcode {
    fn from(line: ControlLine) -> Self {
        match line {
            ControlLine::Send => Opcode::Send,
            ControlLine::Grade2 => Opcode::Grade2,
            ControlLine::Grade1 => Opcode::Grade1,
        }
    }
}
