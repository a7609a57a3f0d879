use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// A maximal run of consecutive calendar days without a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreakPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: u32,
}

impl StreakPeriod {
    /// Both ends are inclusive; `end` must not precede `start`.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        let days = (end_date - start_date).num_days() + 1;
        Self {
            start_date,
            end_date,
            days: days.max(1) as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_streak: f64,
    pub total_streaks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub views: u64,
    pub resists: u64,
    pub fails: u64,
}

impl DailyBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            views: 0,
            resists: 0,
            fails: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodMetrics {
    pub total_views: u64,
    pub total_resists: u64,
    pub total_fails: u64,
    pub avg_views: f64,
    pub avg_resists: f64,
    pub avg_fails: f64,
}

/// Figures shared by the user-wide and per-site views.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatsSummary {
    /// Same figure as `current_streak`; surfaced separately for the headline card.
    pub streak_days: u32,
    pub total_views: u64,
    pub total_resists: u64,
    pub total_fails: u64,
    pub success_rate: f64,

    pub current_streak: u32,
    pub longest_streak: u32,
    pub average_streak: f64,
    pub total_streaks: u32,
    pub streaks: Vec<StreakPeriod>,

    pub days_tracked: u32,
    pub visits_per_day: f64,
    pub resists_per_day: f64,
    pub fails_per_day: f64,

    pub avg_views_last_15_days: f64,
    pub avg_resists_last_15_days: f64,
    pub avg_fails_last_15_days: f64,

    pub daily_activity: Vec<DailyBucket>,
    pub last_failure_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SiteStats {
    pub site_id: String,
    #[serde(flatten)]
    pub summary: StatsSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    pub username: String,
    #[serde(flatten)]
    pub summary: StatsSummary,
    pub sites: Vec<SiteStats>,
}
