//! Monochrome framebuffer
//!
//! One bit per pixel, organised as eight horizontal pages of 8 rows each.
//! Bit `n` of a page byte is row `page * 8 + n`, which is what the SH1106
//! expects on the wire.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;

/// Display dimensions
pub const WIDTH: usize = 128;
pub const HEIGHT: usize = 64;
pub const PAGES: usize = HEIGHT / 8;

/// 128×64 1bpp framebuffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    pages: [[u8; WIDTH]; PAGES],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    /// Create a blank framebuffer
    pub const fn new() -> Self {
        Self {
            pages: [[0; WIDTH]; PAGES],
        }
    }

    /// Turn every pixel off
    pub fn clear(&mut self) {
        for page in self.pages.iter_mut() {
            page.fill(0);
        }
    }

    /// Pixel state; out-of-range coordinates read as off
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.pages[y / 8][x] & (1 << (y % 8)) != 0
    }

    fn set_pixel(&mut self, x: usize, y: usize, on: bool) {
        if x >= WIDTH || y >= HEIGHT {
            return;
        }
        let bit = 1 << (y % 8);
        let byte = &mut self.pages[y / 8][x];
        if on {
            *byte |= bit;
        } else {
            *byte &= !bit;
        }
    }

    /// Raw page data, top page first
    pub fn pages(&self) -> &[[u8; WIDTH]; PAGES] {
        &self.pages
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (usize::try_from(point.x), usize::try_from(point.y)) {
                self.set_pixel(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_page_layout() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(3, 10), BinaryColor::On).draw(&mut fb).unwrap();
        assert_eq!(fb.pages()[1][3], 0b0000_0100);
        assert!(fb.pixel(3, 10));
        assert!(!fb.pixel(3, 11));
    }

    #[test]
    fn test_clipping() {
        let mut fb = Framebuffer::new();
        Rectangle::new(Point::new(-4, 60), Size::new(10, 10))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut fb)
            .unwrap();
        assert!(fb.pixel(0, 63));
        assert!(fb.pixel(5, 60));
        assert!(!fb.pixel(6, 60));
    }

    #[test]
    fn test_clear() {
        let mut fb = Framebuffer::new();
        Pixel(Point::new(0, 0), BinaryColor::On).draw(&mut fb).unwrap();
        fb.clear();
        assert_eq!(fb, Framebuffer::new());
    }
}
