use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header::USER_AGENT, HeaderMap},
    Json,
};
use sha2::{Digest, Sha256};

use crate::config::Config;
use crate::dto::{
    Decision, DecisionRequest, DecisionResponse, InterstitialQuery, InterstitialResponse,
};
use crate::error::{AppError, AppResult};
use crate::handlers::check_identifier;
use crate::models::event::{EventAction, EventMetadata, NewEvent};
use crate::models::user::TrackedSite;
use crate::AppState;

/// Block page load: record a view and tell the page where the user was heading.
pub async fn show_interstitial(
    State(state): State<AppState>,
    Path((username, site_id)): Path<(String, String)>,
    Query(query): Query<InterstitialQuery>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> AppResult<Json<InterstitialResponse>> {
    let site = find_site(&state, &username, &site_id).await?;

    let metadata = request_metadata(&state.config, &headers, connect_info, query.session_id);
    let view_event_id = state
        .events
        .append(NewEvent::new(&username, &site_id, EventAction::View).with_metadata(metadata))
        .await?;

    let stats = state.stats.site_statistics(&username, &site_id).await?;

    tracing::info!(
        username = %username,
        site_id = %site_id,
        streak_days = stats.summary.streak_days,
        "Interstitial shown"
    );

    Ok(Json(InterstitialResponse {
        username,
        site_id,
        url: site.url,
        label: site.label,
        view_event_id,
        streak_days: stats.summary.streak_days,
        last_failure_at: stats.summary.last_failure_at,
    }))
}

/// The user's choice on the block page: proceed (fail) or stay focused (resist).
pub async fn record_decision(
    State(state): State<AppState>,
    Path((username, site_id)): Path<(String, String)>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    Json(body): Json<DecisionRequest>,
) -> AppResult<Json<DecisionResponse>> {
    let site = find_site(&state, &username, &site_id).await?;

    let action = body.action.action();
    let metadata = request_metadata(&state.config, &headers, connect_info, body.session_id);
    let event_id = state
        .events
        .append(NewEvent::new(&username, &site_id, action).with_metadata(metadata))
        .await?;

    tracing::info!(
        username = %username,
        site_id = %site_id,
        action = action.as_str(),
        "Decision recorded"
    );

    Ok(Json(DecisionResponse {
        event_id,
        action,
        redirect_url: (body.action == Decision::Visit).then_some(site.url),
    }))
}

async fn find_site(state: &AppState, username: &str, site_id: &str) -> AppResult<TrackedSite> {
    check_identifier("username", username)?;
    check_identifier("site id", site_id)?;

    state
        .users
        .tracked_site(username, site_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Site '{}' is not tracked", site_id)))
}

fn request_metadata(
    config: &Config,
    headers: &HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    session_id: Option<String>,
) -> EventMetadata {
    EventMetadata {
        session_id: session_id.filter(|s| !s.is_empty()),
        user_agent: headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        ip_hash: connect_info.map(|ConnectInfo(addr)| hash_ip(&config.ip_hash_salt, addr)),
    }
}

/// Salted SHA-256 of the client IP; the raw address is never stored.
fn hash_ip(salt: &str, addr: SocketAddr) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(addr.ip().to_string().as_bytes());
    hex::encode(hasher.finalize())
}
