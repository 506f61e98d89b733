//! Line-oriented serial link
//!
//! The transport driver used on both ends of the cable: write a line,
//! check for a received line without waiting, and drain stale input.
//! Writes are attempted once; a failure is reported, never retried.

use braille_hal::{UartRx, UartTx};
use braille_protocol::{ControlLine, Frame};
use heapless::Vec;

/// Longest line the receiver will assemble (a frame is 73 bytes)
pub const MAX_LINE_LEN: usize = 80;

/// A received line, terminator and surrounding whitespace removed
pub type Line<const N: usize = MAX_LINE_LEN> = Vec<u8, N>;

/// A line exceeded the assembler capacity and was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LineOverrun;

/// Errors that can occur on the link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The UART failed while reading
    Read(E),
    /// The UART failed while writing; the line was not delivered
    Write(E),
    /// An over-long line was dropped, or one to send did not fit the buffer
    Overrun,
}

/// Accumulates bytes into `\n`-terminated lines
///
/// Over-long input is thrown away up to the next terminator, so a burst of
/// garbage costs one dropped line and never wedges the receiver.
#[derive(Debug, Clone, Default)]
pub struct LineAssembler<const N: usize = MAX_LINE_LEN> {
    buf: Vec<u8, N>,
    discarding: bool,
}

impl<const N: usize> LineAssembler<N> {
    /// Create an empty assembler
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            discarding: false,
        }
    }

    /// Drop any partial line
    pub fn clear(&mut self) {
        self.buf.clear();
        self.discarding = false;
    }

    /// Number of bytes of the partial line held so far
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Feed one byte
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a line,
    /// `Ok(None)` when more bytes are needed, and `Err(LineOverrun)` once
    /// when a line outgrows the buffer.
    pub fn push(&mut self, byte: u8) -> Result<Option<Line<N>>, LineOverrun> {
        if byte == b'\n' {
            if self.discarding {
                self.discarding = false;
                return Ok(None);
            }
            let line = trim(&self.buf);
            self.buf.clear();
            return Ok(Some(line));
        }

        if self.discarding {
            return Ok(None);
        }

        if self.buf.push(byte).is_err() {
            self.buf.clear();
            self.discarding = true;
            return Err(LineOverrun);
        }

        Ok(None)
    }
}

fn trim<const N: usize>(bytes: &[u8]) -> Line<N> {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);

    let mut line = Vec::new();
    // Cannot fail: the slice came out of a buffer of the same capacity
    let _ = line.extend_from_slice(&bytes[start..end]);
    line
}

/// Serial link over any UART
pub struct Link<U, const N: usize = MAX_LINE_LEN> {
    uart: U,
    assembler: LineAssembler<N>,
}

impl<U, const N: usize> Link<U, N> {
    /// Wrap a UART
    pub const fn new(uart: U) -> Self {
        Self {
            uart,
            assembler: LineAssembler::new(),
        }
    }

    /// Borrow the underlying UART
    pub fn uart(&self) -> &U {
        &self.uart
    }

    /// Mutably borrow the underlying UART
    pub fn uart_mut(&mut self) -> &mut U {
        &mut self.uart
    }

    /// Release the underlying UART
    pub fn into_inner(self) -> U {
        self.uart
    }
}

impl<U: UartTx, const N: usize> Link<U, N> {
    /// Write one line, appending `\n` if it is missing
    ///
    /// Line and terminator go out in a single write, so a failure never
    /// leaves an unterminated line behind.
    pub fn send_line(&mut self, line: &[u8]) -> Result<(), LinkError<U::Error>> {
        if line.ends_with(b"\n") {
            self.uart.write_blocking(line).map_err(LinkError::Write)?;
        } else {
            let mut out: Vec<u8, N> = Vec::new();
            out.extend_from_slice(line)
                .and_then(|()| out.push(b'\n').map_err(|_| ()))
                .map_err(|()| LinkError::Overrun)?;
            self.uart.write_blocking(&out).map_err(LinkError::Write)?;
        }
        self.uart.flush().map_err(LinkError::Write)
    }

    /// Encode and write a data frame
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError<U::Error>> {
        self.send_line(&frame.to_line())
    }

    /// Write a control line
    pub fn send_control(&mut self, control: ControlLine) -> Result<(), LinkError<U::Error>> {
        self.send_line(control.as_str().as_bytes())
    }
}

impl<U: UartRx, const N: usize> Link<U, N> {
    /// Return the next complete line, if one has arrived
    ///
    /// Only bytes already pending are read. At most one line is returned
    /// per call; bytes after its terminator stay in the UART for the next call.
    pub fn poll_line(&mut self) -> Result<Option<Line<N>>, LinkError<U::Error>> {
        while let Some(byte) = self.uart.try_read_byte().map_err(LinkError::Read)? {
            match self.assembler.push(byte) {
                Ok(Some(line)) => return Ok(Some(line)),
                Ok(None) => {}
                Err(LineOverrun) => return Err(LinkError::Overrun),
            }
        }
        Ok(None)
    }

    /// Discard all pending input, including any partial line
    ///
    /// Returns the number of bytes thrown away.
    pub fn drain(&mut self) -> Result<usize, LinkError<U::Error>> {
        let mut discarded = self.assembler.pending();
        self.assembler.clear();

        let mut buf = [0u8; 32];
        loop {
            let n = self.uart.read_pending(&mut buf).map_err(LinkError::Read)?;
            if n == 0 {
                return Ok(discarded);
            }
            discarded += n;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use braille_protocol::{Grid, Opcode, FRAME_LEN};
    use std::collections::VecDeque;

    /// In-memory UART: `rx` is what the far end sent, `tx` is what we wrote
    #[derive(Default)]
    pub struct FakeUart {
        pub rx: VecDeque<u8>,
        pub tx: std::vec::Vec<u8>,
        pub fail_writes: bool,
        /// Calls to `write_blocking` so far
        pub writes: usize,
    }

    impl FakeUart {
        pub fn feed(&mut self, bytes: &[u8]) {
            self.rx.extend(bytes.iter().copied());
        }

        pub fn sent_lines(&self) -> std::vec::Vec<String> {
            String::from_utf8_lossy(&self.tx)
                .lines()
                .map(str::to_owned)
                .collect()
        }
    }

    impl UartTx for FakeUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            self.writes += 1;
            if self.fail_writes {
                return Err(());
            }
            self.tx.extend_from_slice(data);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }
    }

    impl UartRx for FakeUart {
        type Error = ();

        fn read_pending(&mut self, buf: &mut [u8]) -> Result<usize, ()> {
            let mut n = 0;
            while n < buf.len() {
                match self.rx.pop_front() {
                    Some(byte) => {
                        buf[n] = byte;
                        n += 1;
                    }
                    None => break,
                }
            }
            Ok(n)
        }
    }

    #[test]
    fn test_assembler_trims_terminators() {
        let mut asm = LineAssembler::<16>::new();
        for &b in b" SEND\r" {
            assert_eq!(asm.push(b), Ok(None));
        }
        let line = asm.push(b'\n').unwrap().unwrap();
        assert_eq!(&line[..], b"SEND");
    }

    #[test]
    fn test_assembler_overrun_discards_until_newline() {
        let mut asm = LineAssembler::<4>::new();
        for &b in b"abcd" {
            assert_eq!(asm.push(b), Ok(None));
        }
        assert_eq!(asm.push(b'e'), Err(LineOverrun));
        // Rest of the long line is swallowed silently
        assert_eq!(asm.push(b'f'), Ok(None));
        assert_eq!(asm.push(b'\n'), Ok(None));

        for &b in b"ok" {
            assert_eq!(asm.push(b), Ok(None));
        }
        assert_eq!(&asm.push(b'\n').unwrap().unwrap()[..], b"ok");
    }

    #[test]
    fn test_poll_line_without_data() {
        let mut link: Link<FakeUart> = Link::new(FakeUart::default());
        assert_eq!(link.poll_line(), Ok(None));
    }

    #[test]
    fn test_poll_line_partial_then_complete() {
        let mut link: Link<FakeUart> = Link::new(FakeUart::default());
        link.uart_mut().feed(b"Tr");
        assert_eq!(link.poll_line(), Ok(None));

        link.uart_mut().feed(b"ue\nSEND\n");
        let line = link.poll_line().unwrap().unwrap();
        assert_eq!(Opcode::from_line(core::str::from_utf8(&line).unwrap()), Opcode::Grade2);

        // Second line is still waiting in the UART
        assert_eq!(link.uart().rx.len(), 5);
        assert_eq!(&link.poll_line().unwrap().unwrap()[..], b"SEND");
    }

    #[test]
    fn test_send_frame_writes_one_line() {
        let mut link: Link<FakeUart> = Link::new(FakeUart::default());
        link.send_frame(&Frame::alert(Grid::BLANK)).unwrap();

        let lines = link.uart().sent_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), FRAME_LEN);
        assert!(lines[0].starts_with('1'));
    }

    #[test]
    fn test_send_control_appends_newline() {
        let mut link: Link<FakeUart> = Link::new(FakeUart::default());
        link.send_control(ControlLine::Send).unwrap();
        assert_eq!(link.uart().tx, b"SEND\n");
    }

    #[test]
    fn test_line_and_terminator_written_together() {
        let mut link: Link<FakeUart> = Link::new(FakeUart::default());
        link.send_control(ControlLine::Grade2).unwrap();
        link.send_frame(&Frame::ordinary(Grid::BLANK)).unwrap();
        assert_eq!(link.uart().writes, 2);
        assert_eq!(link.uart().sent_lines()[0], "True");
    }

    #[test]
    fn test_line_too_long_to_send() {
        let mut link: Link<FakeUart, 4> = Link::new(FakeUart::default());
        assert_eq!(link.send_line(b"SEND"), Err(LinkError::Overrun));
        assert_eq!(link.uart().writes, 0);
        assert_eq!(link.send_line(b"Tru"), Ok(()));
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut link: Link<FakeUart> = Link::new(FakeUart {
            fail_writes: true,
            ..FakeUart::default()
        });
        assert_eq!(link.send_control(ControlLine::Send), Err(LinkError::Write(())));
    }

    #[test]
    fn test_drain_discards_everything() {
        let mut link: Link<FakeUart> = Link::new(FakeUart::default());
        link.uart_mut().feed(b"SE");
        assert_eq!(link.poll_line(), Ok(None));

        link.uart_mut().feed(b"ND\nTrue\nFalse\n");
        assert_eq!(link.drain(), Ok(16));
        assert_eq!(link.poll_line(), Ok(None));
    }

    #[test]
    fn test_overrun_reported_once() {
        let mut link: Link<FakeUart, 8> = Link::new(FakeUart::default());
        link.uart_mut().feed(b"0123456789abcdef\nSEND\n");

        assert_eq!(link.poll_line(), Err(LinkError::Overrun));
        assert_eq!(&link.poll_line().unwrap().unwrap()[..], b"SEND");
    }
}
