//! Refresh tick generator
//!
//! Decouples the display refresh cadence from the poll loop rate. Fires at
//! most once per call; after a stall the next fire is measured from the
//! moment it was reported, so missed intervals are never replayed.

/// Display refresh interval
pub const DEFAULT_TICK_MS: u32 = 500;

/// Periodic trigger over a monotonic millisecond clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickGenerator {
    interval_ms: u32,
    last_fire_ms: u64,
}

impl TickGenerator {
    /// Create a generator whose first fire is one interval after `now_ms`
    pub const fn new(interval_ms: u32, now_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fire_ms: now_ms,
        }
    }

    /// Interval between fires
    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    /// Returns true if an interval has elapsed since the last fire
    ///
    /// On fire, the reference point moves to `now_ms` rather than to the
    /// missed boundary.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_fire_ms) >= self.interval_ms as u64 {
            self.last_fire_ms = now_ms;
            true
        } else {
            false
        }
    }
}
