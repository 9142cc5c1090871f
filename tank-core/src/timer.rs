//! Timer service: the interrupt-driven overflow counter.
//!
//! One periodic hardware timer overflow is the only concurrent activity in the
//! system. The interrupt handler calls [`OverflowCounter::tick`]; everything
//! else reads and resets the counter from the main polling loop. The enable
//! gate models the timer interrupt-enable bit, so drivers can claim a clean
//! baseline without racing the handler.

use portable_atomic::{AtomicBool, AtomicU8, Ordering};

/// Free-running u8 overflow counter shared between the timer interrupt and the
/// main loop.
///
/// Safe for use in interrupt contexts: the handler is the only incrementer and
/// the main loop the only resetter, both through atomic operations.
pub struct OverflowCounter {
    ticks: AtomicU8,
    enabled: AtomicBool,
}

impl OverflowCounter {
    /// Create a new counter, disabled, at zero
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU8::new(0),
            enabled: AtomicBool::new(false),
        }
    }

    /// Record one timer overflow. Called from the interrupt handler; counts
    /// only while enabled, wrapping at 255.
    pub fn tick(&self) {
        if self.enabled.load(Ordering::Relaxed) {
            self.ticks.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Current overflow count
    pub fn get(&self) -> u8 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Set the counter to a baseline value (the ranging driver uses 1 as its
    /// sentinel so a no-overflow measurement multiplies by one)
    pub fn set(&self, value: u8) {
        self.ticks.store(value, Ordering::Relaxed);
    }

    /// Reset the counter to zero
    pub fn reset(&self) {
        self.set(0);
    }

    /// Allow the interrupt handler to count overflows
    pub fn enable(&self) {
        self.enabled.store(true, Ordering::Relaxed);
    }

    /// Stop counting overflows; pending value is retained
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Whether overflow counting is currently enabled
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

impl Default for OverflowCounter {
    fn default() -> Self {
        Self::new()
    }
}
