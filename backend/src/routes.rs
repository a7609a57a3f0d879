use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::handlers;
use crate::AppState;

pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors = cors_layer(&state.config)?;

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/badges", get(handlers::stats::all_badges));

    let user_routes = Router::new()
        .route("/api/users/:user", get(handlers::users::get_user))
        .route(
            "/api/users/:user/sites",
            get(handlers::users::list_sites).post(handlers::users::add_site),
        )
        // Interstitial block page
        .route(
            "/api/users/:user/block/:site",
            get(handlers::block::show_interstitial).post(handlers::block::record_decision),
        )
        // Event log
        .route("/api/users/:user/events", get(handlers::events::list_events))
        .route(
            "/api/users/:user/events/latest",
            get(handlers::events::latest_event),
        )
        // Stats & badges
        .route("/api/users/:user/stats", get(handlers::stats::user_stats))
        .route(
            "/api/users/:user/stats/:site",
            get(handlers::stats::site_stats),
        )
        .route(
            "/api/users/:user/badges",
            get(handlers::stats::earned_badges),
        );

    Ok(Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

fn cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = vec![config
        .frontend_url
        .parse::<HeaderValue>()
        .context("FRONTEND_URL is not a valid origin")?];
    for extra in &config.cors_extra_origins {
        match extra.parse::<HeaderValue>() {
            Ok(hv) => origins.push(hv),
            Err(_) => tracing::warn!(origin = %extra, "Ignoring invalid CORS origin"),
        }
    }

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::db::memory::{MemoryEventLog, MemoryUserDirectory};
    use crate::services::BadgeCatalogue;

    struct TestApp {
        router: Router,
        events: Arc<MemoryEventLog>,
    }

    fn test_app() -> TestApp {
        let events = Arc::new(MemoryEventLog::new());
        let users = Arc::new(MemoryUserDirectory::new());
        let state = AppState::new(
            Arc::new(Config::for_tests()),
            events.clone(),
            users,
            Arc::new(BadgeCatalogue::load().unwrap()),
        );
        TestApp {
            router: build_router(state).unwrap(),
            events,
        }
    }

    async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn track_imgur(app: &TestApp) {
        let (status, _) = send(
            app,
            post_json(
                "/api/users/alice/sites",
                json!({ "site_id": "imgur", "url": "https://imgur.com", "label": "Imgur" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = test_app();
        let (status, body) = send(&app, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, get_req("/readyz")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"], "ok");
    }

    #[tokio::test]
    async fn untracked_site_is_not_found_and_records_nothing() {
        let app = test_app();

        let (status, body) = send(&app, get_req("/api/users/alice/block/imgur")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], 404);
        assert_eq!(app.events.len().await, 0);
    }

    #[tokio::test]
    async fn duplicate_site_conflicts() {
        let app = test_app();
        track_imgur(&app).await;

        let (status, _) = send(
            &app,
            post_json(
                "/api/users/alice/sites",
                json!({ "site_id": "imgur", "url": "https://imgur.com" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn invalid_site_request_is_rejected() {
        let app = test_app();
        let (status, _) = send(
            &app,
            post_json("/api/users/alice/sites", json!({ "site_id": "", "url": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn site_id_with_whitespace_is_rejected() {
        let app = test_app();
        let (status, body) = send(
            &app,
            post_json(
                "/api/users/alice/sites",
                json!({ "site_id": "my site", "url": "https://example.com" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], 400);

        let (_, sites) = send(&app, get_req("/api/users/alice/sites")).await;
        assert_eq!(sites, json!([]));
    }

    #[tokio::test]
    async fn interstitial_flow_records_events_and_feeds_stats() {
        let app = test_app();
        track_imgur(&app).await;

        let (status, body) = send(&app, get_req("/api/users/alice/block/imgur?session_id=s1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://imgur.com");
        assert_eq!(body["label"], "Imgur");
        assert_eq!(body["streak_days"], 1);

        let (status, body) = send(
            &app,
            post_json("/api/users/alice/block/imgur", json!({ "action": "stay" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "resist");
        assert!(body.get("redirect_url").is_none());

        send(&app, get_req("/api/users/alice/block/imgur")).await;
        let (status, body) = send(
            &app,
            post_json("/api/users/alice/block/imgur", json!({ "action": "visit" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["action"], "fail");
        assert_eq!(body["redirect_url"], "https://imgur.com");

        assert_eq!(app.events.len().await, 4);

        let (status, stats) = send(&app, get_req("/api/users/alice/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["username"], "alice");
        assert_eq!(stats["total_views"], 2);
        assert_eq!(stats["total_resists"], 1);
        assert_eq!(stats["total_fails"], 1);
        assert_eq!(stats["success_rate"], 50.0);
        // Everything happened today, and today has a failure.
        assert_eq!(stats["current_streak"], 0);
        assert_eq!(stats["total_streaks"], 0);
        assert_eq!(stats["days_tracked"], 1);
        assert!(stats["last_failure_at"].is_string());
        assert_eq!(stats["sites"][0]["site_id"], "imgur");
        assert_eq!(stats["sites"][0]["total_fails"], 1);

        let (status, site) = send(&app, get_req("/api/users/alice/stats/imgur")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(site["site_id"], "imgur");
        assert_eq!(site["total_views"], 2);
        assert_eq!(site["daily_activity"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn events_can_be_listed_and_latest_fetched() {
        let app = test_app();
        track_imgur(&app).await;
        send(&app, get_req("/api/users/alice/block/imgur")).await;
        send(
            &app,
            post_json("/api/users/alice/block/imgur", json!({ "action": "visit" })),
        )
        .await;

        let (status, events) = send(&app, get_req("/api/users/alice/events?limit=1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(events.as_array().unwrap().len(), 1);

        let (status, events) = send(&app, get_req("/api/users/alice/events?order=asc")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(events[0]["action"], "view");

        let (_, latest) =
            send(&app, get_req("/api/users/alice/events/latest?action=view")).await;
        assert_eq!(latest["action"], "view");

        let (_, none) = send(&app, get_req("/api/users/bob/events/latest")).await;
        assert!(none.is_null());

        let (status, _) = send(&app, get_req("/api/users/alice/events?limit=0")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_user_stats_are_zero() {
        let app = test_app();
        let (status, stats) = send(&app, get_req("/api/users/ghost/stats")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(stats["streak_days"], 0);
        assert_eq!(stats["average_streak"], 0.0);
        assert_eq!(stats["sites"], json!([]));
    }

    #[tokio::test]
    async fn badges_follow_streak_days() {
        let app = test_app();
        track_imgur(&app).await;
        send(&app, get_req("/api/users/alice/block/imgur")).await;

        let (status, body) = send(&app, get_req("/api/users/alice/badges")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["streak_days"], 1);
        assert_eq!(body["badges"][0]["id"], "first-day");
        assert_eq!(body["badges"][0]["newly"], true);

        let (status, all) = send(&app, get_req("/api/badges")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(all.as_array().unwrap().len() >= body["badges"].as_array().unwrap().len());
        assert!(all[0].get("earned").is_none());
        assert!(all[0].get("newly").is_none());
    }
}
