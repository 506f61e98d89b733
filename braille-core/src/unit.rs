//! Display unit poll loop
//!
//! Ties the link, buttons, FIFO, tick generator, buzzer and renderer
//! together. [`DisplayUnit::poll`] does one bounded pass and returns a
//! [`PollReport`] describing what happened; logging is left to the caller.

use braille_hal::{InputPin, OutputPin, UartRx, UartTx};
use braille_protocol::{ControlLine, Frame, FrameError, Grid, Priority};

use crate::buzzer::Buzzer;
use crate::config::{UnitConfig, DEFAULT_FIFO_CAPACITY};
use crate::fifo::ReceiveFifo;
use crate::input::{ButtonEvents, ButtonPanel};
use crate::link::{Link, LinkError};
use crate::tick::TickGenerator;
use crate::traits::{BrailleDisplay, DisplayError, TimeOfDay};

/// Link failure seen during a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkFault {
    /// The UART reported a receive error
    Read,
    /// A control line could not be written
    Write,
    /// A line was too long to receive or to send
    Overrun,
}

impl<E> From<LinkError<E>> for LinkFault {
    fn from(err: LinkError<E>) -> Self {
        match err {
            LinkError::Read(_) => LinkFault::Read,
            LinkError::Write(_) => LinkFault::Write,
            LinkError::Overrun => LinkFault::Overrun,
        }
    }
}

/// Content lost because the FIFO was full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoOverflow {
    /// The incoming ordinary grid was refused
    Rejected,
    /// A queued grid was evicted to make room
    Evicted,
}

/// What one [`DisplayUnit::poll`] call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollReport {
    /// A non-empty line arrived: its priority, or why it was dropped
    pub received: Option<Result<Priority, FrameError>>,
    /// Content lost to a full FIFO
    pub overflow: Option<FifoOverflow>,
    /// Receive side failure
    pub rx_fault: Option<LinkFault>,
    /// Control lines that could not be written
    pub tx_failed: Option<LinkFault>,
    /// Button pulses
    pub buttons: ButtonEvents,
    /// The tick fired and the screen was refreshed
    pub rendered: bool,
    /// First render error of this poll
    pub display_fault: Option<DisplayError>,
}

/// The display unit
///
/// `N` is the receive FIFO capacity.
pub struct DisplayUnit<U, P, O, D, const N: usize = DEFAULT_FIFO_CAPACITY> {
    link: Link<U>,
    buttons: ButtonPanel<P>,
    fifo: ReceiveFifo<N>,
    ticker: TickGenerator,
    buzzer: Buzzer<O>,
    display: D,
    /// Last grid handed to the renderer
    shown: Option<Grid>,
    clock_offset_ms: u64,
}

impl<U, P, O, D, const N: usize> DisplayUnit<U, P, O, D, N>
where
    U: UartTx + UartRx,
    P: InputPin,
    O: OutputPin,
    D: BrailleDisplay,
{
    /// Assemble the unit and draw the initial screen
    ///
    /// The screen starts with a blank grid, the current time and grade 1.
    /// Once a grid has been shown it stays up until the FIFO offers another.
    /// Render failures here are returned alongside the unit so the caller
    /// can log them; the unit keeps working regardless.
    pub fn new(
        config: UnitConfig,
        uart: U,
        buttons: ButtonPanel<P>,
        buzzer_pin: O,
        display: D,
        now_ms: u64,
    ) -> (Self, Option<DisplayError>) {
        let mut unit = Self {
            link: Link::new(uart),
            buttons,
            fifo: ReceiveFifo::new(config.overflow),
            ticker: TickGenerator::new(config.tick_interval_ms, now_ms),
            buzzer: Buzzer::new(buzzer_pin, config.buzzer_ms),
            display,
            shown: None,
            clock_offset_ms: 0,
        };

        let mut fault = None;
        unit.refresh(now_ms, &mut fault);
        (unit, fault)
    }

    /// One pass of the cooperative loop
    pub fn poll(&mut self, now_ms: u64) -> PollReport {
        let mut report = PollReport::default();

        self.receive(now_ms, &mut report);

        report.buttons = self.buttons.poll(now_ms);
        self.report_buttons(&mut report);

        self.fifo.advance(report.buttons.next);

        if self.ticker.poll(now_ms) {
            self.refresh(now_ms, &mut report.display_fault);
            report.rendered = true;
        }

        self.buzzer.update(now_ms);
        report
    }

    fn receive(&mut self, now_ms: u64, report: &mut PollReport) {
        let line = match self.link.poll_line() {
            Ok(Some(line)) => line,
            Ok(None) => return,
            Err(err) => {
                report.rx_fault = Some(err.into());
                return;
            }
        };

        // Stray terminators carry nothing
        if line.is_empty() {
            return;
        }

        let frame = match Frame::decode(&line) {
            Ok(frame) => frame,
            Err(err) => {
                report.received = Some(Err(err));
                return;
            }
        };
        report.received = Some(Ok(frame.priority));

        match frame.priority {
            Priority::Alert => {
                self.buzzer.sound(now_ms);
                if self.fifo.push_front(frame.grid).is_some() {
                    report.overflow = Some(FifoOverflow::Evicted);
                }
            }
            Priority::Ordinary => match self.fifo.push_back(frame.grid) {
                Ok(None) => {}
                Ok(Some(_)) => report.overflow = Some(FifoOverflow::Evicted),
                Err(_) => report.overflow = Some(FifoOverflow::Rejected),
            },
        }
    }

    fn report_buttons(&mut self, report: &mut PollReport) {
        let events = report.buttons;

        if events.mode_toggled {
            let control = ControlLine::from_mode(self.buttons.grade2());
            if let Err(err) = self.link.send_control(control) {
                report.tx_failed = Some(err.into());
            }
        }

        if events.send {
            if let Err(err) = self.link.send_control(ControlLine::Send) {
                report.tx_failed = Some(err.into());
            }
        }
    }

    fn refresh(&mut self, now_ms: u64, fault: &mut Option<DisplayError>) {
        let time = self.time_of_day(now_ms);
        let grade2 = self.buttons.grade2();
        let mut note = |result: Result<(), DisplayError>| {
            if let Err(err) = result {
                fault.get_or_insert(err);
            }
        };

        note(self.display.render_time(time));
        note(self.display.render_mode(grade2));

        // An empty FIFO leaves the last grid on screen; blank is only drawn
        // until the first grid has been rendered.
        let target = match self.fifo.peek() {
            Some(front) => *front,
            None if self.shown.is_none() => Grid::BLANK,
            None => return,
        };
        if self.shown != Some(target) {
            let result = self.display.render(&target);
            if result.is_ok() {
                self.shown = Some(target);
            }
            note(result);
        }
    }

    /// Time of day for a monotonic timestamp
    pub fn time_of_day(&self, now_ms: u64) -> TimeOfDay {
        TimeOfDay::from_millis(now_ms.wrapping_add(self.clock_offset_ms))
    }

    /// Set the wall-clock offset added to the monotonic clock
    pub fn set_clock_offset(&mut self, offset_ms: u64) {
        self.clock_offset_ms = offset_ms;
    }

    /// Current mode flag (true = grade 2)
    pub fn grade2(&self) -> bool {
        self.buttons.grade2()
    }

    /// The receive FIFO
    pub fn fifo(&self) -> &ReceiveFifo<N> {
        &self.fifo
    }

    /// Returns true while the buzzer sounds
    pub fn is_buzzing(&self) -> bool {
        self.buzzer.is_sounding()
    }

    /// Borrow the renderer
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Mutably borrow the renderer, e.g. to flush a framebuffer
    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    /// Borrow the link, e.g. to inspect the UART
    pub fn link(&self) -> &Link<U> {
        &self.link
    }

    /// Mutably borrow the link
    pub fn link_mut(&mut self) -> &mut Link<U> {
        &mut self.link
    }
}
