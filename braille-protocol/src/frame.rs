//! Frame encoding and decoding.
//!
//! Frame format (one line, ASCII):
//! - HEADER (1 char): `0` ordinary content, `1` alert
//! - BITS (72 chars): 12 cells × 6 dots, `0`/`1`, each cell in [`WIRE_ORDER`]
//! - TERMINATOR: `\n` (not part of [`FRAME_LEN`])

use crate::cell::{Cell, Grid, CELL_DOTS, GRID_CELLS};

/// Data bits per frame
pub const DATA_BITS: usize = GRID_CELLS * CELL_DOTS;

/// Frame length before the terminator
pub const FRAME_LEN: usize = 1 + DATA_BITS;

/// Frame length including the `\n` terminator
pub const LINE_LEN: usize = FRAME_LEN + 1;

/// Transmission position `i` carries logical dot index `WIRE_ORDER[i]`
///
/// On the wire a cell reads `d1 d4 d2 d5 d3 d6`, which is how the
/// actuators are wired, row by row across the two dot columns.
pub const WIRE_ORDER: [usize; CELL_DOTS] = [0, 3, 1, 4, 2, 5];

const HEADER_ORDINARY: u8 = b'0';
const HEADER_ALERT: u8 = b'1';

/// Errors that can occur during frame decoding or encoding
///
/// [`FrameError::WrongLength`] and [`FrameError::InvalidCharacter`] both mean
/// the line is a malformed frame and must be dropped whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Line length (without terminator) is not [`FRAME_LEN`]
    WrongLength(usize),
    /// A character other than `0`/`1` at this position
    InvalidCharacter(usize),
    /// Buffer too small for encoding
    BufferTooSmall,
}

impl FrameError {
    /// Returns true if this error describes a malformed received line
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            FrameError::WrongLength(_) | FrameError::InvalidCharacter(_)
        )
    }
}

/// Delivery priority carried in the frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Priority {
    /// Queued behind earlier content
    Ordinary,
    /// Pre-empts queued content and sounds the buzzer
    Alert,
}

impl Priority {
    /// Parse a header character
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            HEADER_ORDINARY => Some(Priority::Ordinary),
            HEADER_ALERT => Some(Priority::Alert),
            _ => None,
        }
    }

    /// Header character for this priority
    pub fn to_byte(self) -> u8 {
        match self {
            Priority::Ordinary => HEADER_ORDINARY,
            Priority::Alert => HEADER_ALERT,
        }
    }
}

/// A decoded or constructed frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Header priority
    pub priority: Priority,
    /// Cells in logical dot order
    pub grid: Grid,
}

impl Frame {
    /// Create a new frame
    pub const fn new(priority: Priority, grid: Grid) -> Self {
        Self { priority, grid }
    }

    /// Ordinary (header `0`) frame
    pub const fn ordinary(grid: Grid) -> Self {
        Self::new(Priority::Ordinary, grid)
    }

    /// Alert (header `1`) frame
    pub const fn alert(grid: Grid) -> Self {
        Self::new(Priority::Alert, grid)
    }

    /// Encode this frame, terminator included, into a byte buffer
    ///
    /// Returns the number of bytes written (always [`LINE_LEN`])
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        if buffer.len() < LINE_LEN {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.priority.to_byte();
        let bits = &mut buffer[1..FRAME_LEN];
        for (cell, out) in self.grid.cells().iter().zip(bits.chunks_exact_mut(CELL_DOTS)) {
            let dots = cell.dots();
            for (slot, &logical) in out.iter_mut().zip(WIRE_ORDER.iter()) {
                *slot = if dots[logical] { b'1' } else { b'0' };
            }
        }
        buffer[FRAME_LEN] = b'\n';

        Ok(LINE_LEN)
    }

    /// Encode this frame into a fixed-size line
    pub fn to_line(&self) -> [u8; LINE_LEN] {
        let mut line = [0u8; LINE_LEN];
        // Cannot fail: the buffer is exactly LINE_LEN
        let _ = self.encode(&mut line);
        line
    }

    /// Decode a received line (terminator already removed)
    ///
    /// The whole line is validated before anything is returned.
    pub fn decode(line: &[u8]) -> Result<Self, FrameError> {
        if line.len() != FRAME_LEN {
            return Err(FrameError::WrongLength(line.len()));
        }

        let priority = Priority::from_byte(line[0]).ok_or(FrameError::InvalidCharacter(0))?;

        let mut cells = [Cell::BLANK; GRID_CELLS];
        for (index, (cell, chunk)) in cells
            .iter_mut()
            .zip(line[1..].chunks_exact(CELL_DOTS))
            .enumerate()
        {
            let mut dots = [false; CELL_DOTS];
            for (offset, (&byte, &logical)) in chunk.iter().zip(WIRE_ORDER.iter()).enumerate() {
                dots[logical] = match byte {
                    b'0' => false,
                    b'1' => true,
                    _ => return Err(FrameError::InvalidCharacter(1 + index * CELL_DOTS + offset)),
                };
            }
            *cell = Cell::new(dots);
        }

        Ok(Self {
            priority,
            grid: Grid::new(cells),
        })
    }
}
