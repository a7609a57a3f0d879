use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A site the user asked to be soft-blocked from.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrackedSite {
    pub site_id: String,
    pub url: String,
    pub label: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewTrackedSite {
    pub site_id: String,
    pub url: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub tracked_sites: Vec<TrackedSite>,
}
