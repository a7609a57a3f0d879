use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::models::event::{Event, EventAction, EventMetadata};

/// Day `n` counted from 2024-01-01 (day 1).
pub fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i64::from(n) - 1)
}

/// Noon UTC on day `n`.
pub fn at_day(n: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day(n).and_hms_opt(12, 0, 0).unwrap())
}

pub fn event_on(n: u32, action: EventAction) -> Event {
    Event {
        id: Uuid::new_v4(),
        username: "alice".into(),
        site_id: "x".into(),
        action,
        timestamp: at_day(n),
        metadata: EventMetadata::default(),
    }
}
