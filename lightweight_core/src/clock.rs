//! Time source for set creation.
//!
//! Sets carry a local calendar date and a creation timestamp. Both come from a
//! `Clock` so tests can pin them.

use chrono::{Local, NaiveDate, Utc};
use std::cell::Cell;

pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Today's date in the local calendar
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Pinned clock for tests; each read of `now_millis` advances by one
#[derive(Debug)]
pub struct FixedClock {
    today: NaiveDate,
    millis: Cell<i64>,
}

impl FixedClock {
    pub fn new(today: NaiveDate, millis: i64) -> Self {
        Self {
            today,
            millis: Cell::new(millis),
        }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        let now = self.millis.get();
        self.millis.set(now + 1);
        now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
