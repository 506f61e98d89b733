//! Serial port transport
//!
//! Adapts a `serialport` handle to the shared UART traits so the host can
//! use the same [`braille_core::Link`] as the display unit.

use std::io::{self, Read, Write};
use std::time::Duration;

use braille_hal::{UartConfig, UartRx, UartTx};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

/// Blocking read timeout; reads are only issued for bytes already pending
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial port errors
#[derive(Debug, thiserror::Error)]
pub enum SerialError {
    #[error("cannot open {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialport error: {0}")]
    Serialport(#[from] serialport::Error),
}

/// Host end of the link
pub struct SerialUart {
    port: Box<dyn SerialPort>,
}

impl SerialUart {
    /// Open a port with 8N1 framing and no flow control
    pub fn open(path: &str, baud: u32) -> Result<Self, SerialError> {
        let config = UartConfig::with_baudrate(baud);
        let port = serialport::new(path, config.baudrate)
            .data_bits(data_bits(&config))
            .parity(parity(&config))
            .stop_bits(stop_bits(&config))
            .flow_control(FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| SerialError::Open {
                port: path.to_owned(),
                source,
            })?;

        tracing::info!(port = path, baud, "serial port open");
        Ok(Self { port })
    }

    /// Wrap an already open port
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

fn data_bits(config: &UartConfig) -> DataBits {
    match config.data_bits {
        braille_hal::uart::DataBits::Seven => DataBits::Seven,
        braille_hal::uart::DataBits::Eight => DataBits::Eight,
    }
}

fn parity(config: &UartConfig) -> Parity {
    match config.parity {
        braille_hal::uart::Parity::None => Parity::None,
        braille_hal::uart::Parity::Even => Parity::Even,
        braille_hal::uart::Parity::Odd => Parity::Odd,
    }
}

fn stop_bits(config: &UartConfig) -> StopBits {
    match config.stop_bits {
        braille_hal::uart::StopBits::One => StopBits::One,
        braille_hal::uart::StopBits::Two => StopBits::Two,
    }
}

impl UartTx for SerialUart {
    type Error = SerialError;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), SerialError> {
        Ok(self.port.write_all(data)?)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        Ok(self.port.flush()?)
    }
}

impl UartRx for SerialUart {
    type Error = SerialError;

    fn read_pending(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let pending = self.port.bytes_to_read()? as usize;
        if pending == 0 || buf.is_empty() {
            return Ok(0);
        }
        let want = pending.min(buf.len());
        Ok(self.port.read(&mut buf[..want])?)
    }
}
