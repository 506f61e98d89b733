//! Render collaborator for the display unit

use braille_protocol::Grid;

const MS_PER_DAY: u64 = 24 * 60 * 60 * 1000;

/// Errors that can occur while rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the display controller
    Communication,
    /// Display not initialized
    NotInitialized,
}

/// Wall-clock time shown in the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl TimeOfDay {
    /// Time of day for a millisecond count, wrapping every 24 h
    pub fn from_millis(ms: u64) -> Self {
        let secs = (ms % MS_PER_DAY) / 1000;
        Self {
            hours: (secs / 3600) as u8,
            minutes: ((secs / 60) % 60) as u8,
            seconds: (secs % 60) as u8,
        }
    }

    /// Formatted as `HH:MM:SS`
    pub fn to_ascii(&self) -> [u8; 8] {
        let digits = |v: u8| [b'0' + v / 10, b'0' + v % 10];
        let [h1, h0] = digits(self.hours);
        let [m1, m0] = digits(self.minutes);
        let [s1, s0] = digits(self.seconds);
        [h1, h0, b':', m1, m0, b':', s1, s0]
    }
}

/// Something that can show a braille grid, the clock and the mode
///
/// The core decides *when* to render; implementations decide *how*.
pub trait BrailleDisplay {
    /// Show a grid; dots arrive in logical order
    fn render(&mut self, grid: &Grid) -> Result<(), DisplayError>;

    /// Show the time of day
    fn render_time(&mut self, time: TimeOfDay) -> Result<(), DisplayError>;

    /// Show the translation mode (false = grade 1, true = grade 2)
    fn render_mode(&mut self, grade2: bool) -> Result<(), DisplayError>;
}
