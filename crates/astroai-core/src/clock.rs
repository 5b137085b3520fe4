//! Time source abstraction.
//!
//! The exit guard and the forecast cache both depend on "now"; routing every
//! read through [`Clock`] keeps them deterministic under test.

use chrono::{DateTime, Duration, Local, NaiveDate};
use std::sync::Mutex;

/// Supplies the current local time.
pub trait Clock: Send + Sync {
    /// Current local date-time.
    fn now(&self) -> DateTime<Local>;

    /// Current local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `millis` milliseconds.
    pub fn advance_millis(&self, millis: i64) {
        self.advance(Duration::milliseconds(millis));
    }

    pub fn advance(&self, delta: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }

    pub fn set(&self, value: DateTime<Local>) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = value;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
