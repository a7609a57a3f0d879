use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::event::{Event, EventAction, EventQuery, NewEvent, SortDirection};

/// Append-only log of interstitial events.
#[async_trait]
pub trait EventLog: Send + Sync {
    /// Record one event and return its id.
    async fn append(&self, event: NewEvent) -> AppResult<Uuid>;

    /// Events matching `query`, ordered by timestamp.
    async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>>;

    /// Latest event for the user, optionally narrowed by site and action.
    async fn most_recent(
        &self,
        username: &str,
        site_id: Option<&str>,
        action: Option<EventAction>,
    ) -> AppResult<Option<Event>>;

    async fn ping(&self) -> AppResult<()>;
}

const EVENT_COLUMNS: &str =
    "id, username, site_id, action, occurred_at, session_id, user_agent, ip_hash";

#[derive(Clone)]
pub struct PgEventLog {
    pool: PgPool,
}

impl PgEventLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventLog for PgEventLog {
    async fn append(&self, event: NewEvent) -> AppResult<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO events (id, username, site_id, action, occurred_at, session_id, user_agent, ip_hash)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&event.username)
        .bind(&event.site_id)
        .bind(event.action)
        .bind(event.timestamp.unwrap_or_else(Utc::now))
        .bind(&event.metadata.session_id)
        .bind(&event.metadata.user_agent)
        .bind(&event.metadata.ip_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(
            event_id = %id,
            username = %event.username,
            site_id = %event.site_id,
            action = event.action.as_str(),
            "Event recorded"
        );

        Ok(id)
    }

    async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder
            .push(EVENT_COLUMNS)
            .push(" FROM events WHERE username = ")
            .push_bind(&query.username);

        if let Some(site_id) = &query.site_id {
            builder.push(" AND site_id = ").push_bind(site_id);
        }

        builder.push(match query.direction {
            SortDirection::Asc => " ORDER BY occurred_at ASC",
            SortDirection::Desc => " ORDER BY occurred_at DESC",
        });

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }

        let events = builder
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn most_recent(
        &self,
        username: &str,
        site_id: Option<&str>,
        action: Option<EventAction>,
    ) -> AppResult<Option<Event>> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder
            .push(EVENT_COLUMNS)
            .push(" FROM events WHERE username = ")
            .push_bind(username);

        if let Some(site_id) = site_id {
            builder.push(" AND site_id = ").push_bind(site_id);
        }
        if let Some(action) = action {
            builder.push(" AND action = ").push_bind(action);
        }
        builder.push(" ORDER BY occurred_at DESC LIMIT 1");

        let event = builder
            .build_query_as::<Event>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
