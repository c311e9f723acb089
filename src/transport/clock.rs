//! Microsecond clocks for the publish scheduler
//!
//! Timestamps are `u32` microseconds and wrap roughly every 71.6 minutes.
//! The scheduler only ever subtracts them with wrapping arithmetic.

use std::cell::Cell;
use std::rc::Rc;

use tokio::time::Instant;

/// Source of the current time in wrapping microseconds
pub trait Clock {
    fn now_us(&self) -> u32;
}

/// Monotonic clock counting from its creation
///
/// Backed by `tokio::time::Instant`, so it follows a paused runtime clock.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_us(&self) -> u32 {
        // Truncation is the wraparound
        self.start.elapsed().as_micros() as u32
    }
}

/// Clock advanced by hand, for simulations and tests
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u32>>,
}

impl ManualClock {
    pub fn new(start_us: u32) -> Self {
        Self {
            now: Rc::new(Cell::new(start_us)),
        }
    }

    pub fn set(&self, us: u32) {
        self.now.set(us);
    }

    pub fn advance(&self, us: u32) {
        self.now.set(self.now.get().wrapping_add(us));
    }
}

impl Clock for ManualClock {
    fn now_us(&self) -> u32 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_clock_advances() {
        let clock = MonotonicClock::new();
        let a = clock.now_us();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = clock.now_us();
        assert!(b.wrapping_sub(a) >= 1_000);
    }

    #[test]
    fn test_manual_clock_shared() {
        let clock = ManualClock::new(10);
        let handle = clock.clone();
        handle.advance(5);
        assert_eq!(clock.now_us(), 15);

        handle.set(u32::MAX);
        handle.advance(2);
        assert_eq!(clock.now_us(), 1);
    }
}
