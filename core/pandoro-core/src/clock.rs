//! Source of "now" for the session, injectable for tests.

use chrono::{Local, NaiveDate, Utc};

pub trait Clock {
    /// Current wall-clock time, epoch seconds.
    fn epoch(&self) -> i64;

    /// Today's date in the user's local time zone.
    fn today(&self) -> NaiveDate;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch(&self) -> i64 {
        Utc::now().timestamp()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
