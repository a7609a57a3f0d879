//! Calendar-day streaks over an event log.
//!
//! A streak is a maximal run of consecutive days, between the first and last
//! observed event dates, on which no `Fail` was recorded. Failure days split
//! streaks and never belong to one.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};

use crate::models::event::{Event, EventAction};
use crate::models::stats::{StreakPeriod, StreakSummary};
use crate::services::calendar::Calendar;
use crate::services::metrics::round_ratio;

/// Split the observed date range into streak periods.
///
/// Input order is not trusted; events are sorted by timestamp first.
pub fn compute_streak_periods(events: &[Event], calendar: &Calendar) -> Vec<StreakPeriod> {
    let mut ordered: Vec<&Event> = events.iter().collect();
    ordered.sort_by_key(|e| e.timestamp);

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return Vec::new();
    };
    let first_date = calendar.date_of(first.timestamp);
    let last_date = calendar.date_of(last.timestamp);

    let failure_dates: BTreeSet<NaiveDate> = ordered
        .iter()
        .filter(|e| e.action == EventAction::Fail)
        .map(|e| calendar.date_of(e.timestamp))
        .collect();

    let mut periods = Vec::new();
    let mut open_start: Option<NaiveDate> = None;

    for date in first_date.iter_days().take_while(|d| *d <= last_date) {
        if failure_dates.contains(&date) {
            if let Some(start) = open_start.take() {
                periods.push(StreakPeriod::new(start, date - Duration::days(1)));
            }
        } else if open_start.is_none() {
            open_start = Some(date);
        }
    }

    if let Some(start) = open_start {
        periods.push(StreakPeriod::new(start, last_date));
    }

    periods
}

pub fn longest_streak(periods: &[StreakPeriod]) -> u32 {
    periods.iter().map(|p| p.days).max().unwrap_or(0)
}

/// Mean period length, two decimals, half-up.
pub fn average_streak(periods: &[StreakPeriod]) -> f64 {
    let total: u64 = periods.iter().map(|p| u64::from(p.days)).sum();
    round_ratio(total, periods.len() as u64, 2)
}

/// Length of the chronologically last period, which ends at the last
/// recorded day rather than today.
pub fn current_streak(periods: &[StreakPeriod]) -> u32 {
    periods.last().map(|p| p.days).unwrap_or(0)
}

impl StreakSummary {
    pub fn from_periods(periods: &[StreakPeriod]) -> Self {
        Self {
            current_streak: current_streak(periods),
            longest_streak: longest_streak(periods),
            average_streak: average_streak(periods),
            total_streaks: periods.len() as u32,
        }
    }
}
