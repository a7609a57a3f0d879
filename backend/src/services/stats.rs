use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::db::{EventLog, UserDirectory};
use crate::error::AppResult;
use crate::models::event::{Event, EventAction, EventQuery};
use crate::models::stats::{SiteStats, StatsSummary, StreakSummary, UserStats};
use crate::services::calendar::{inclusive_span, Calendar};
use crate::services::metrics::{bucket_events_by_day, period_metrics, round_ratio};
use crate::services::streak::compute_streak_periods;

/// Days shown in the activity chart.
pub const RECENT_ACTIVITY_DAYS: u32 = 30;
/// Days behind the "recent averages" figures.
pub const RECENT_AVERAGE_DAYS: u32 = 15;

/// Builds statistics from the event log. Every call rereads the full history.
#[derive(Clone)]
pub struct StatsService {
    events: Arc<dyn EventLog>,
    users: Arc<dyn UserDirectory>,
    calendar: Calendar,
}

impl StatsService {
    pub fn new(events: Arc<dyn EventLog>, users: Arc<dyn UserDirectory>, calendar: Calendar) -> Self {
        Self {
            events,
            users,
            calendar,
        }
    }

    pub async fn user_statistics(&self, username: &str) -> AppResult<UserStats> {
        self.user_statistics_at(username, Utc::now()).await
    }

    pub async fn user_statistics_at(&self, username: &str, now: DateTime<Utc>) -> AppResult<UserStats> {
        let history = self.events.list(&EventQuery::for_user(username)).await?;
        let tracked = self.users.tracked_sites(username).await?;

        let mut site_ids: BTreeSet<String> = tracked.into_iter().map(|s| s.site_id).collect();
        site_ids.extend(history.iter().map(|e| e.site_id.clone()));

        let mut sites: Vec<SiteStats> = site_ids
            .into_iter()
            .map(|site_id| {
                let scoped: Vec<Event> = history
                    .iter()
                    .filter(|e| e.site_id == site_id)
                    .cloned()
                    .collect();
                SiteStats {
                    summary: summarize(&scoped, &self.calendar, now),
                    site_id,
                }
            })
            .collect();

        // Most problematic sites first
        sites.sort_by(|a, b| {
            b.summary
                .total_fails
                .cmp(&a.summary.total_fails)
                .then_with(|| a.site_id.cmp(&b.site_id))
        });

        let summary = summarize(&history, &self.calendar, now);

        tracing::debug!(
            username,
            events = history.len(),
            sites = sites.len(),
            current_streak = summary.current_streak,
            "Computed user statistics"
        );

        Ok(UserStats {
            username: username.to_string(),
            summary,
            sites,
        })
    }

    pub async fn site_statistics(&self, username: &str, site_id: &str) -> AppResult<SiteStats> {
        self.site_statistics_at(username, site_id, Utc::now()).await
    }

    pub async fn site_statistics_at(
        &self,
        username: &str,
        site_id: &str,
        now: DateTime<Utc>,
    ) -> AppResult<SiteStats> {
        let history = self
            .events
            .list(&EventQuery::for_user(username).site(site_id))
            .await?;
        let summary = summarize(&history, &self.calendar, now);

        tracing::debug!(
            username,
            site_id,
            events = history.len(),
            current_streak = summary.current_streak,
            "Computed site statistics"
        );

        Ok(SiteStats {
            site_id: site_id.to_string(),
            summary,
        })
    }
}

/// All figures for one subject (a user, or a user and site).
///
/// An empty history produces an all-zero summary.
pub fn summarize(events: &[Event], calendar: &Calendar, now: DateTime<Utc>) -> StatsSummary {
    let (views, resists, fails) = events.iter().fold((0u64, 0u64, 0u64), |(v, r, f), e| {
        match e.action {
            EventAction::View => (v + 1, r, f),
            EventAction::Resist => (v, r + 1, f),
            EventAction::Fail => (v, r, f + 1),
        }
    });

    let streaks = compute_streak_periods(events, calendar);
    let streak = StreakSummary::from_periods(&streaks);

    let days_tracked = match (
        events.iter().map(|e| e.timestamp).min(),
        events.iter().map(|e| e.timestamp).max(),
    ) {
        (Some(first), Some(last)) => inclusive_span(calendar.date_of(first), calendar.date_of(last)),
        _ => 0,
    };
    let span = u64::from(days_tracked);

    let recent = period_metrics(&bucket_events_by_day(
        events,
        calendar,
        Some(calendar.trailing_window(now, RECENT_AVERAGE_DAYS)),
    ));
    let daily_activity = bucket_events_by_day(
        events,
        calendar,
        Some(calendar.trailing_window(now, RECENT_ACTIVITY_DAYS)),
    );

    let last_failure_at = events
        .iter()
        .filter(|e| e.action == EventAction::Fail)
        .map(|e| e.timestamp)
        .max();

    StatsSummary {
        streak_days: streak.current_streak,
        total_views: views,
        total_resists: resists,
        total_fails: fails,
        success_rate: round_ratio(resists * 100, views, 1),

        current_streak: streak.current_streak,
        longest_streak: streak.longest_streak,
        average_streak: streak.average_streak,
        total_streaks: streak.total_streaks,
        streaks,

        days_tracked,
        visits_per_day: round_ratio(views, span, 2),
        resists_per_day: round_ratio(resists, span, 2),
        fails_per_day: round_ratio(fails, span, 2),

        avg_views_last_15_days: recent.avg_views,
        avg_resists_last_15_days: recent.avg_resists,
        avg_fails_last_15_days: recent.avg_fails,

        daily_activity,
        last_failure_at,
    }
}
