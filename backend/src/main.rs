use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;

mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod routes;
mod services;

use config::Config;
use db::{EventLog, PgEventLog, PgUserDirectory, UserDirectory};
use services::{BadgeCatalogue, StatsService};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventLog>,
    pub users: Arc<dyn UserDirectory>,
    pub stats: StatsService,
    pub badges: Arc<BadgeCatalogue>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        events: Arc<dyn EventLog>,
        users: Arc<dyn UserDirectory>,
        badges: Arc<BadgeCatalogue>,
    ) -> Self {
        let stats = StatsService::new(events.clone(), users.clone(), config.calendar());
        Self {
            config,
            events,
            users,
            stats,
            badges,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "softblock_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env()?);

    // Database
    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations applied");

    let badges = Arc::new(BadgeCatalogue::load()?);

    let state = AppState::new(
        config.clone(),
        Arc::new(PgEventLog::new(pool.clone())),
        Arc::new(PgUserDirectory::new(pool.clone())),
        badges,
    );

    let app = routes::build_router(state)?;

    let addr = config.listen_addr();
    tracing::info!(
        utc_offset_minutes = config.stats_utc_offset_minutes,
        "Starting server on {}",
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    // Connect info feeds the hashed client IP on recorded events
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    pool.close().await;
    tracing::info!("Database pool closed");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
