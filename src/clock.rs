//! Injected time source.
//!
//! Loop integration depends on the true wall-clock delta between ticks, but
//! sampling the system clock inside the control code makes every run
//! non-reproducible. The coordinator therefore reads time through [`Clock`]:
//! hosts pass [`MonotonicClock`]; tests drive [`ManualClock`] by hand.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now(&self) -> Duration;
}

/// Clock backed by `std::time::Instant`.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock. Clones share the same time, so a test can keep one
/// handle and move the copy owned by the coordinator.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}
