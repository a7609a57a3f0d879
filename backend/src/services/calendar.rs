use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Offset, Utc};

/// Day-truncation convention shared by every statistic.
///
/// Timestamps are shifted into a fixed UTC offset before the date is taken,
/// so a single `Calendar` must be used for all figures in one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    offset: FixedOffset,
}

impl Calendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn date_of(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Window of the last `days` calendar days ending at (and including) the day of `now`.
    pub fn trailing_window(&self, now: DateTime<Utc>, days: u32) -> DateWindow {
        let end = self.date_of(now);
        let start = end - Duration::days(i64::from(days.saturating_sub(1)));
        DateWindow { start, end }
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::utc()
    }
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Inclusive number of calendar days between two dates.
pub fn inclusive_span(first: NaiveDate, last: NaiveDate) -> u32 {
    let days = (last - first).num_days() + 1;
    days.max(0) as u32
}
