//! Monotonic time source for retry scheduling, plus the calendar year that
//! anchors lookback windows.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::Datelike;

/// Elapsed time since the clock's own origin.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;

    /// Current calendar year, or `None` when the clock has no calendar.
    fn current_year(&self) -> Option<i32> {
        None
    }
}

#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn current_year(&self) -> Option<i32> {
        Some(chrono::Local::now().year())
    }
}

/// Clock that only moves when told to. Has no calendar until `set_year`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
    year: Mutex<Option<i32>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }

    pub fn set_year(&self, year: i32) {
        *self.year.lock().unwrap_or_else(PoisonError::into_inner) = Some(year);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_year(&self) -> Option<i32> {
        *self.year.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
