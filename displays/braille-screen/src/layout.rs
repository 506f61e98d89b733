//! Braille screen layout
//!
//! Status line across the top (clock left, mode right), then the grid as
//! two rows of six cells. Each cell is drawn as the braille reader feels
//! it: d1-d3 down the left column, d4-d6 down the right.

use braille_core::{BrailleDisplay, DisplayError, TimeOfDay};
use braille_protocol::{Cell, Grid, GRID_COLUMNS};
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::framebuffer::{Framebuffer, WIDTH};

const STATUS_HEIGHT: u32 = 10;
const TIME_X: i32 = 0;
const MODE_X: i32 = WIDTH as i32 - 7 * 6;

const GRID_TOP: i32 = 14;
const CELL_PITCH_X: i32 = 21;
const CELL_PITCH_Y: i32 = 25;
const CELL_MARGIN_X: i32 = 4;
const DOT_PITCH: i32 = 7;
const DOT_DIAMETER: u32 = 5;

/// Top-left corner of the bounding box of dot `index` (0-based) in `cell`
pub fn dot_origin(cell: usize, index: usize) -> Point {
    let col = (cell % GRID_COLUMNS) as i32;
    let row = (cell / GRID_COLUMNS) as i32;
    let x = col * CELL_PITCH_X + CELL_MARGIN_X + (index / 3) as i32 * DOT_PITCH;
    let y = GRID_TOP + row * CELL_PITCH_Y + (index % 3) as i32 * DOT_PITCH;
    Point::new(x, y)
}

/// Centre pixel of dot `index` in `cell`
pub fn dot_center(cell: usize, index: usize) -> Point {
    dot_origin(cell, index) + Point::new(DOT_DIAMETER as i32 / 2, DOT_DIAMETER as i32 / 2)
}

/// The display unit's screen
pub struct BrailleScreen {
    fb: Framebuffer,
    dirty: bool,
}

impl Default for BrailleScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl BrailleScreen {
    pub const fn new() -> Self {
        Self {
            fb: Framebuffer::new(),
            dirty: true,
        }
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }

    /// Returns true once after each change, then resets
    pub fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    /// Mark the frame for another flush, e.g. after a failed one
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn blank(&mut self, area: Rectangle) {
        let _ = area
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(&mut self.fb);
    }

    fn text(&mut self, x: i32, text: &str) {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let _ = Text::with_baseline(text, Point::new(x, 0), style, Baseline::Top).draw(&mut self.fb);
    }

    fn draw_cell(&mut self, index: usize, cell: &Cell) {
        let raised = PrimitiveStyle::with_fill(BinaryColor::On);
        for (dot, _) in cell.dots().iter().enumerate().filter(|&(_, &up)| up) {
            let _ = Circle::new(dot_origin(index, dot), DOT_DIAMETER)
                .into_styled(raised)
                .draw(&mut self.fb);
        }
    }
}

impl BrailleDisplay for BrailleScreen {
    fn render(&mut self, grid: &Grid) -> Result<(), DisplayError> {
        let top = GRID_TOP;
        self.blank(Rectangle::new(
            Point::new(0, top),
            Size::new(WIDTH as u32, (crate::HEIGHT as i32 - top) as u32),
        ));
        for (index, cell) in grid.cells().iter().enumerate() {
            self.draw_cell(index, cell);
        }
        self.dirty = true;
        Ok(())
    }

    fn render_time(&mut self, time: TimeOfDay) -> Result<(), DisplayError> {
        let ascii = time.to_ascii();
        let text = core::str::from_utf8(&ascii).unwrap_or("--:--:--");
        self.blank(Rectangle::new(
            Point::new(TIME_X, 0),
            Size::new((MODE_X - TIME_X) as u32, STATUS_HEIGHT),
        ));
        self.text(TIME_X, text);
        self.dirty = true;
        Ok(())
    }

    fn render_mode(&mut self, grade2: bool) -> Result<(), DisplayError> {
        self.blank(Rectangle::new(
            Point::new(MODE_X, 0),
            Size::new(WIDTH as u32 - MODE_X as u32, STATUS_HEIGHT),
        ));
        self.text(MODE_X, if grade2 { "GRADE 2" } else { "GRADE 1" });
        self.dirty = true;
        Ok(())
    }
}
