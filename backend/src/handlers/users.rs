use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::dto::AddTrackedSiteRequest;
use crate::error::AppResult;
use crate::handlers::check_identifier;
use crate::models::user::{TrackedSite, UserProfile};
use crate::AppState;

pub async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<UserProfile>> {
    check_identifier("username", &username)?;

    let user = state.users.find_or_create(&username).await?;
    let tracked_sites = state.users.tracked_sites(&username).await?;

    Ok(Json(UserProfile {
        user,
        tracked_sites,
    }))
}

pub async fn list_sites(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<Vec<TrackedSite>>> {
    check_identifier("username", &username)?;

    let sites = state.users.tracked_sites(&username).await?;
    Ok(Json(sites))
}

pub async fn add_site(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(body): Json<AddTrackedSiteRequest>,
) -> AppResult<(StatusCode, Json<TrackedSite>)> {
    check_identifier("username", &username)?;
    body.validate()?;
    check_identifier("site id", &body.site_id)?;

    let site = state.users.add_tracked_site(&username, body.into()).await?;

    tracing::info!(username = %username, site_id = %site.site_id, "Tracked site added");

    Ok((StatusCode::CREATED, Json(site)))
}
