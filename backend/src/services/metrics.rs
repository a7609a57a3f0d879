use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::event::{Event, EventAction};
use crate::models::stats::{DailyBucket, PeriodMetrics};
use crate::services::calendar::{Calendar, DateWindow};

/// `numerator / denominator` rounded half-up to `places` decimals.
///
/// Rounding is done on integers so values like 1.005 are not skewed by
/// binary floating point. A zero denominator yields 0.
pub fn round_ratio(numerator: u64, denominator: u64, places: u32) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    let scale = 10u128.pow(places);
    let num = u128::from(numerator) * scale * 2 + u128::from(denominator);
    let scaled = num / (u128::from(denominator) * 2);
    scaled as f64 / scale as f64
}

/// Count events per calendar day and action.
///
/// Only days with at least one event appear; the result is ascending by date.
pub fn bucket_events_by_day(
    events: &[Event],
    calendar: &Calendar,
    window: Option<DateWindow>,
) -> Vec<DailyBucket> {
    let mut buckets: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();

    for event in events {
        let date = calendar.date_of(event.timestamp);
        if window.is_some_and(|w| !w.contains(date)) {
            continue;
        }
        let bucket = buckets.entry(date).or_insert_with(|| DailyBucket::empty(date));
        match event.action {
            EventAction::View => bucket.views += 1,
            EventAction::Resist => bucket.resists += 1,
            EventAction::Fail => bucket.fails += 1,
        }
    }

    buckets.into_values().collect()
}

/// Totals and per-bucket averages. Days absent from `buckets` do not lower the averages.
pub fn period_metrics(buckets: &[DailyBucket]) -> PeriodMetrics {
    let total_views: u64 = buckets.iter().map(|b| b.views).sum();
    let total_resists: u64 = buckets.iter().map(|b| b.resists).sum();
    let total_fails: u64 = buckets.iter().map(|b| b.fails).sum();
    let days = buckets.len() as u64;

    PeriodMetrics {
        total_views,
        total_resists,
        total_fails,
        avg_views: round_ratio(total_views, days, 2),
        avg_resists: round_ratio(total_resists, days, 2),
        avg_fails: round_ratio(total_fails, days, 2),
    }
}
