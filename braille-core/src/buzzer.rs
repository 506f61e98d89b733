//! Alert buzzer
//!
//! Sounding is started synchronously when an alert frame is queued and
//! stopped from the poll loop once the on-time has passed.

use braille_hal::OutputPin;

/// How long the buzzer sounds per alert
pub const DEFAULT_BUZZER_MS: u32 = 1000;

/// Buzzer on a push-pull output, active high
pub struct Buzzer<O> {
    pin: O,
    on_ms: u32,
    off_at_ms: Option<u64>,
}

impl<O: OutputPin> Buzzer<O> {
    /// Create a silent buzzer
    pub fn new(mut pin: O, on_ms: u32) -> Self {
        pin.set_low();
        Self {
            pin,
            on_ms,
            off_at_ms: None,
        }
    }

    /// Start sounding; a second alert while sounding extends the on-time
    pub fn sound(&mut self, now_ms: u64) {
        self.pin.set_high();
        self.off_at_ms = Some(now_ms + self.on_ms as u64);
    }

    /// Stop sounding once the on-time has elapsed
    pub fn update(&mut self, now_ms: u64) {
        if let Some(off_at) = self.off_at_ms {
            if now_ms >= off_at {
                self.pin.set_low();
                self.off_at_ms = None;
            }
        }
    }

    /// Returns true while sounding
    pub fn is_sounding(&self) -> bool {
        self.off_at_ms.is_some()
    }
}
