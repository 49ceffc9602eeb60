//! Inclusive calendar-day windows used to query the Open-Meteo endpoints.

use chrono::{Duration, NaiveDate};
use std::fmt;

/// An inclusive range of calendar days (`start_date` .. `end_date` in API terms).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Creates a window, swapping the bounds if they are given in reverse.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    /// A single day.
    pub fn day(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    /// `today - days ..= today`.
    pub fn trailing(today: NaiveDate, days: u32) -> Self {
        Self::new(today - Duration::days(i64::from(days)), today)
    }

    /// Tomorrow through `horizon_days` ahead of `today`.
    pub fn forecast(today: NaiveDate, horizon_days: u32) -> Self {
        let horizon = i64::from(horizon_days.max(1));
        Self::new(today + Duration::days(1), today + Duration::days(horizon))
    }

    /// Number of calendar days covered, inclusive.
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Splits the window into consecutive, non-overlapping chunks of at most
    /// `chunk_days` days.
    pub fn chunks(&self, chunk_days: u32) -> Vec<DateWindow> {
        let step = i64::from(chunk_days.max(1));
        let mut chunks = Vec::new();
        let mut current = self.start;
        while current <= self.end {
            let chunk_end = (current + Duration::days(step - 1)).min(self.end);
            chunks.push(DateWindow::new(current, chunk_end));
            current = chunk_end + Duration::days(1);
        }
        chunks
    }

    pub(crate) fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    pub(crate) fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.start_param(), self.end_param())
    }
}
