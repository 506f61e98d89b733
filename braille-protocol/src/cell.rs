//! Braille cells and the fixed display grid.
//!
//! Dots are numbered the braille way: d1-d3 down the left column,
//! d4-d6 down the right column. Index `i` in a [`Cell`] is dot `i + 1`.

/// Dots per braille cell
pub const CELL_DOTS: usize = 6;

/// Cells per display grid
pub const GRID_CELLS: usize = 12;

/// Cells per display row
pub const GRID_COLUMNS: usize = 6;

/// Display rows
pub const GRID_ROWS: usize = GRID_CELLS / GRID_COLUMNS;

/// One braille character: six dots in logical order `(d1, d2, d3, d4, d5, d6)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cell([bool; CELL_DOTS]);

impl Cell {
    /// Cell with no dots raised
    pub const BLANK: Self = Self([false; CELL_DOTS]);

    /// Create a cell from dots in logical order
    pub const fn new(dots: [bool; CELL_DOTS]) -> Self {
        Self(dots)
    }

    /// Create a cell from a dot mask (bit 0 = d1 ... bit 5 = d6)
    ///
    /// Bits above bit 5 are ignored.
    pub const fn from_mask(mask: u8) -> Self {
        Self([
            mask & 0x01 != 0,
            mask & 0x02 != 0,
            mask & 0x04 != 0,
            mask & 0x08 != 0,
            mask & 0x10 != 0,
            mask & 0x20 != 0,
        ])
    }

    /// Dot mask (bit 0 = d1 ... bit 5 = d6)
    pub fn mask(&self) -> u8 {
        self.0
            .iter()
            .enumerate()
            .fold(0, |mask, (i, &raised)| mask | ((raised as u8) << i))
    }

    /// Dots in logical order
    pub const fn dots(&self) -> [bool; CELL_DOTS] {
        self.0
    }

    /// Is dot `n` (1-based, 1..=6) raised?
    pub fn dot(&self, n: usize) -> bool {
        n >= 1 && n <= CELL_DOTS && self.0[n - 1]
    }

    /// Returns true if no dot is raised
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|&d| !d)
    }
}

/// One full display frame: 12 cells, row-major, 6 cells per row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Grid([Cell; GRID_CELLS]);

impl Grid {
    /// Grid with every cell blank
    pub const BLANK: Self = Self([Cell::BLANK; GRID_CELLS]);

    /// Create a grid from exactly 12 cells
    pub const fn new(cells: [Cell; GRID_CELLS]) -> Self {
        Self(cells)
    }

    /// Build a grid from any number of cells
    ///
    /// Keeps the first 12 cells and pads a shorter sequence with blank cells.
    /// This is the 72-bit normalisation applied to translated text.
    pub fn from_cells_padded<I>(cells: I) -> Self
    where
        I: IntoIterator<Item = Cell>,
    {
        let mut grid = Self::BLANK;
        for (slot, cell) in grid.0.iter_mut().zip(cells) {
            *slot = cell;
        }
        grid
    }

    /// All cells, row-major
    pub fn cells(&self) -> &[Cell; GRID_CELLS] {
        &self.0
    }

    /// Cell at `index` (row-major)
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.0.get(index)
    }

    /// Mutable cell at `index` (row-major)
    pub fn cell_mut(&mut self, index: usize) -> Option<&mut Cell> {
        self.0.get_mut(index)
    }

    /// Iterate over display rows of [`GRID_COLUMNS`] cells
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.0.chunks(GRID_COLUMNS)
    }

    /// Returns true if every cell is blank
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(Cell::is_blank)
    }
}
