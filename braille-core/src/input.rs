//! Button debouncing
//!
//! Each button is a two-state machine, [`ButtonState::Released`] and
//! [`ButtonState::Pressed`]. A press emits exactly one pulse; holding the
//! button across any number of polls emits nothing more, and the release
//! emits nothing at all.
//!
//! After every accepted edge the channel ignores its input for a settling
//! window, so contact bounce on either edge cannot produce extra pulses.
//! The window is tracked per channel from timestamps: polling never sleeps,
//! and one bouncing button does not hold up the others.

use braille_hal::InputPin;

/// Debounced button state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ButtonState {
    Released,
    Pressed,
}

/// Debounce state machine for one input channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    state: ButtonState,
    /// Time of the last accepted edge, `None` before the first one
    last_edge_ms: Option<u64>,
    settle_ms: u32,
}

impl Channel {
    /// Create a released channel
    pub const fn new(settle_ms: u32) -> Self {
        Self {
            state: ButtonState::Released,
            last_edge_ms: None,
            settle_ms,
        }
    }

    /// Current debounced state
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Returns true while the debounced state is pressed
    pub fn is_pressed(&self) -> bool {
        self.state == ButtonState::Pressed
    }

    fn settled(&self, now_ms: u64) -> bool {
        self.last_edge_ms
            .map_or(true, |edge| now_ms.saturating_sub(edge) >= self.settle_ms as u64)
    }

    /// Feed one raw sample
    ///
    /// `active` is the logical level (pressed = true). Returns true on the
    /// poll where the channel goes Released → Pressed, false otherwise.
    pub fn update(&mut self, active: bool, now_ms: u64) -> bool {
        if !self.settled(now_ms) {
            return false;
        }

        match (self.state, active) {
            (ButtonState::Released, true) => {
                self.state = ButtonState::Pressed;
                self.last_edge_ms = Some(now_ms);
                true
            }
            (ButtonState::Pressed, false) => {
                self.state = ButtonState::Released;
                self.last_edge_ms = Some(now_ms);
                false
            }
            _ => false,
        }
    }
}

/// A pulled-up push button: the line reads low while pressed
pub struct Button<P> {
    pin: P,
    channel: Channel,
}

impl<P: InputPin> Button<P> {
    /// Create a button on an active-low pin
    pub fn new(pin: P, settle_ms: u32) -> Self {
        Self {
            pin,
            channel: Channel::new(settle_ms),
        }
    }

    /// Sample the pin; returns true on a new press
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let active = self.pin.is_low();
        self.channel.update(active, now_ms)
    }

    /// Debounced state
    pub fn state(&self) -> ButtonState {
        self.channel.state()
    }
}

/// Pulses produced by one poll of the button panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvents {
    /// `next` was pressed: consume the displayed grid
    pub next: bool,
    /// `mode` was pressed: the mode flag flipped
    pub mode_toggled: bool,
    /// `send` was pressed: ask the host to capture speech
    pub send: bool,
}

impl ButtonEvents {
    /// Returns true if any pulse fired
    pub fn any(&self) -> bool {
        self.next || self.mode_toggled || self.send
    }
}

/// The unit's three buttons plus the persistent mode flag
pub struct ButtonPanel<P> {
    next: Button<P>,
    mode: Button<P>,
    send: Button<P>,
    /// false = grade 1, true = grade 2
    grade2: bool,
}

impl<P: InputPin> ButtonPanel<P> {
    /// Create the panel; the mode flag starts at grade 1
    pub fn new(next: P, mode: P, send: P, settle_ms: u32) -> Self {
        Self {
            next: Button::new(next, settle_ms),
            mode: Button::new(mode, settle_ms),
            send: Button::new(send, settle_ms),
            grade2: false,
        }
    }

    /// Current mode flag (true = grade 2)
    pub fn grade2(&self) -> bool {
        self.grade2
    }

    /// Sample all three buttons once
    ///
    /// The mode flag flips exactly once per press of the mode button.
    pub fn poll(&mut self, now_ms: u64) -> ButtonEvents {
        let next = self.next.poll(now_ms);

        let mode_toggled = self.mode.poll(now_ms);
        if mode_toggled {
            self.grade2 = !self.grade2;
        }

        let send = self.send.poll(now_ms);

        ButtonEvents {
            next,
            mode_toggled,
            send,
        }
    }
}
