use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::dto::{EventListQuery, LatestEventQuery};
use crate::error::AppResult;
use crate::handlers::check_identifier;
use crate::models::event::{Event, EventQuery};
use crate::AppState;

pub async fn list_events(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<EventListQuery>,
) -> AppResult<Json<Vec<Event>>> {
    check_identifier("username", &username)?;
    query.validate()?;

    let mut filter = EventQuery::for_user(&username)
        .direction(query.order.unwrap_or_default())
        .limit(query.limit);
    if let Some(site_id) = query.site_id {
        filter = filter.site(site_id);
    }

    let events = state.events.list(&filter).await?;
    Ok(Json(events))
}

pub async fn latest_event(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<LatestEventQuery>,
) -> AppResult<Json<Option<Event>>> {
    check_identifier("username", &username)?;

    let event = state
        .events
        .most_recent(&username, query.site_id.as_deref(), query.action)
        .await?;
    Ok(Json(event))
}
