//! SH1106 OLED Display Driver
//!
//! Pushes a 128x64 [`Framebuffer`] to an SH1106 panel over I2C, one page
//! at a time.

use braille_screen::{Framebuffer, PAGES, WIDTH};

/// SH1106 I2C address (typically 0x3C or 0x3D)
const SH1106_ADDR: u8 = 0x3C;

/// The SH1106 RAM is 132 columns wide; 128-column panels start at column 2
const COLUMN_OFFSET: u8 = 2;

/// SH1106 commands
mod cmd {
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_DISPLAY_OFFSET: u8 = 0xD3;
    pub const SET_COM_PINS: u8 = 0xDA;
    pub const SET_VCOM_DETECT: u8 = 0xDB;
    pub const SET_CLOCK_DIV: u8 = 0xD5;
    pub const SET_PRECHARGE: u8 = 0xD9;
    pub const SET_MUX_RATIO: u8 = 0xA8;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_START_LINE: u8 = 0x40;
    pub const SET_SEG_REMAP: u8 = 0xA1;
    pub const SET_COM_SCAN_DEC: u8 = 0xC8;
    pub const SET_CHARGE_PUMP: u8 = 0x8D;
}

/// SH1106 OLED driver
pub struct Sh1106<I2C> {
    i2c: I2C,
}

impl<I2C> Sh1106<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Initialize the display
    pub async fn init(&mut self) -> Result<(), I2C::Error> {
        let init_cmds: &[u8] = &[
            cmd::DISPLAY_OFF,
            cmd::SET_CLOCK_DIV,
            0x80,
            cmd::SET_MUX_RATIO,
            0x3F, // 64 lines
            cmd::SET_DISPLAY_OFFSET,
            0x00,
            cmd::SET_START_LINE,
            cmd::SET_CHARGE_PUMP,
            0x14,
            cmd::SET_SEG_REMAP,
            cmd::SET_COM_SCAN_DEC,
            cmd::SET_COM_PINS,
            0x12,
            cmd::SET_CONTRAST,
            0xCF,
            cmd::SET_PRECHARGE,
            0xF1,
            cmd::SET_VCOM_DETECT,
            0x40,
            cmd::SET_NORMAL,
            cmd::DISPLAY_ON,
        ];

        for &c in init_cmds {
            self.command(c).await?;
        }

        Ok(())
    }

    async fn command(&mut self, cmd: u8) -> Result<(), I2C::Error> {
        self.i2c.write(SH1106_ADDR, &[0x00, cmd]).await
    }

    /// Send the whole framebuffer to the panel
    pub async fn flush(&mut self, fb: &Framebuffer) -> Result<(), I2C::Error> {
        let mut data = [0u8; WIDTH + 1];
        data[0] = 0x40; // Data mode

        for (page, bytes) in fb.pages().iter().enumerate().take(PAGES) {
            self.command(cmd::SET_PAGE_ADDR | page as u8).await?;
            self.command(cmd::SET_LOW_COLUMN | COLUMN_OFFSET).await?;
            self.command(cmd::SET_HIGH_COLUMN).await?;

            data[1..].copy_from_slice(bytes);
            self.i2c.write(SH1106_ADDR, &data).await?;
        }

        Ok(())
    }
}
