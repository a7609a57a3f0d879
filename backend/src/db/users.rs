use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::user::{NewTrackedSite, TrackedSite, User};

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch the user, creating an empty account on first sight.
    async fn find_or_create(&self, username: &str) -> AppResult<User>;

    async fn tracked_sites(&self, username: &str) -> AppResult<Vec<TrackedSite>>;

    async fn tracked_site(&self, username: &str, site_id: &str) -> AppResult<Option<TrackedSite>>;

    /// Fails with `Conflict` if the user already tracks `site.site_id`.
    async fn add_tracked_site(&self, username: &str, site: NewTrackedSite) -> AppResult<TrackedSite>;
}

#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    async fn find_or_create(&self, username: &str) -> AppResult<User> {
        // No-op update so RETURNING yields the existing row on conflict
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username)
            VALUES ($1, $2)
            ON CONFLICT (username) DO UPDATE
                SET username = users.username
            RETURNING id, username, email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn tracked_sites(&self, username: &str) -> AppResult<Vec<TrackedSite>> {
        let sites = sqlx::query_as::<_, TrackedSite>(
            r#"
            SELECT ts.site_id, ts.url, ts.label, ts.created_at, ts.is_active
            FROM tracked_sites ts
            JOIN users u ON u.id = ts.user_id
            WHERE u.username = $1
            ORDER BY ts.created_at ASC
            "#,
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await?;

        Ok(sites)
    }

    async fn tracked_site(&self, username: &str, site_id: &str) -> AppResult<Option<TrackedSite>> {
        let site = sqlx::query_as::<_, TrackedSite>(
            r#"
            SELECT ts.site_id, ts.url, ts.label, ts.created_at, ts.is_active
            FROM tracked_sites ts
            JOIN users u ON u.id = ts.user_id
            WHERE u.username = $1 AND ts.site_id = $2
            "#,
        )
        .bind(username)
        .bind(site_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(site)
    }

    async fn add_tracked_site(&self, username: &str, site: NewTrackedSite) -> AppResult<TrackedSite> {
        let user = self.find_or_create(username).await?;

        let inserted = sqlx::query_as::<_, TrackedSite>(
            r#"
            INSERT INTO tracked_sites (user_id, site_id, url, label)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, site_id) DO NOTHING
            RETURNING site_id, url, label, created_at, is_active
            "#,
        )
        .bind(user.id)
        .bind(&site.site_id)
        .bind(&site.url)
        .bind(&site.label)
        .fetch_optional(&self.pool)
        .await?;

        inserted.ok_or_else(|| {
            AppError::Conflict(format!("Site '{}' is already tracked", site.site_id))
        })
    }
}
