//! Buffered UART adapter
//!
//! The interrupt handler fills the RX ring buffer in the background, so the
//! poll loop only ever copies out bytes that have already arrived.

use braille_hal::{UartConfig, UartRx, UartTx};
use embassy_rp::uart::{self, BufferedUart, DataBits, Parity, StopBits};
use embedded_io::{Read, ReadReady, Write};

/// Host link UART
pub struct RpUart {
    inner: BufferedUart,
}

impl RpUart {
    /// Wrap an already configured buffered UART
    pub fn new(inner: BufferedUart) -> Self {
        Self { inner }
    }
}

impl UartTx for RpUart {
    type Error = uart::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.inner.write_all(data)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Write::flush(&mut self.inner)
    }
}

impl UartRx for RpUart {
    type Error = uart::Error;

    fn read_pending(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if buf.is_empty() || !self.inner.read_ready()? {
            return Ok(0);
        }
        self.inner.read(buf)
    }
}

/// Translate the shared UART settings into an embassy-rp config
pub fn to_rp_config(config: &UartConfig) -> uart::Config {
    let mut rp = uart::Config::default();
    rp.baudrate = config.baudrate;
    rp.data_bits = match config.data_bits {
        braille_hal::uart::DataBits::Seven => DataBits::DataBits7,
        braille_hal::uart::DataBits::Eight => DataBits::DataBits8,
    };
    rp.parity = match config.parity {
        braille_hal::uart::Parity::None => Parity::ParityNone,
        braille_hal::uart::Parity::Even => Parity::ParityEven,
        braille_hal::uart::Parity::Odd => Parity::ParityOdd,
    };
    rp.stop_bits = match config.stop_bits {
        braille_hal::uart::StopBits::One => StopBits::STOP1,
        braille_hal::uart::StopBits::Two => StopBits::STOP2,
    };
    rp
}
