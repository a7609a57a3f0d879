use axum::{
    extract::{Path, State},
    Json,
};

use crate::dto::EarnedBadgesResponse;
use crate::error::AppResult;
use crate::handlers::check_identifier;
use crate::models::badge::Badge;
use crate::models::stats::{SiteStats, UserStats};
use crate::AppState;

pub async fn user_stats(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserStats>> {
    check_identifier("username", &username)?;

    let stats = state.stats.user_statistics(&username).await?;
    Ok(Json(stats))
}

pub async fn site_stats(
    State(state): State<AppState>,
    Path((username, site_id)): Path<(String, String)>,
) -> AppResult<Json<SiteStats>> {
    check_identifier("username", &username)?;
    check_identifier("site id", &site_id)?;

    let stats = state.stats.site_statistics(&username, &site_id).await?;
    Ok(Json(stats))
}

pub async fn earned_badges(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<EarnedBadgesResponse>> {
    check_identifier("username", &username)?;

    let stats = state.stats.user_statistics(&username).await?;
    let streak_days = stats.summary.streak_days;

    Ok(Json(EarnedBadgesResponse {
        username,
        streak_days,
        badges: state.badges.earned_streak_badges(streak_days),
    }))
}

pub async fn all_badges(State(state): State<AppState>) -> Json<Vec<Badge>> {
    Json(state.badges.all_streak_badges())
}
