//! Display unit configuration
//!
//! Timing constants for the unit's poll loop. FIFO capacity is a const
//! generic on [`crate::DisplayUnit`] rather than a runtime value.

use crate::buzzer::DEFAULT_BUZZER_MS;
use crate::fifo::OverflowPolicy;
use crate::tick::DEFAULT_TICK_MS;

/// Button settling window after each accepted edge
pub const DEFAULT_SETTLE_MS: u32 = 100;

/// Default receive FIFO capacity
pub const DEFAULT_FIFO_CAPACITY: usize = 16;

/// Runtime configuration of the display unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnitConfig {
    /// Display refresh interval (ms)
    pub tick_interval_ms: u32,
    /// Button settling window (ms)
    pub settle_ms: u32,
    /// Buzzer on-time per alert (ms)
    pub buzzer_ms: u32,
    /// What to do with ordinary frames when the FIFO is full
    pub overflow: OverflowPolicy,
}

impl UnitConfig {
    /// Reference timings
    pub const fn new() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_MS,
            settle_ms: DEFAULT_SETTLE_MS,
            buzzer_ms: DEFAULT_BUZZER_MS,
            overflow: OverflowPolicy::RejectNewest,
        }
    }
}

impl Default for UnitConfig {
    fn default() -> Self {
        Self::new()
    }
}
