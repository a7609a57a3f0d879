use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// What happened on the interstitial page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "event_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    /// Block page shown.
    View,
    /// User stayed focused.
    Resist,
    /// User proceeded to the blocked site.
    Fail,
}

impl EventAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAction::View => "view",
            EventAction::Resist => "resist",
            EventAction::Fail => "fail",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EventMetadata {
    pub session_id: Option<String>,
    pub user_agent: Option<String>,
    pub ip_hash: Option<String>,
}

impl EventMetadata {
    pub fn is_empty(&self) -> bool {
        self.session_id.is_none() && self.user_agent.is_none() && self.ip_hash.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub username: String,
    pub site_id: String,
    pub action: EventAction,
    #[sqlx(rename = "occurred_at")]
    pub timestamp: DateTime<Utc>,
    #[sqlx(flatten)]
    #[serde(skip_serializing_if = "EventMetadata::is_empty", default)]
    pub metadata: EventMetadata,
}

/// An event that has not been written yet. `timestamp` defaults to now.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub username: String,
    pub site_id: String,
    pub action: EventAction,
    pub timestamp: Option<DateTime<Utc>>,
    pub metadata: EventMetadata,
}

impl NewEvent {
    pub fn new(username: impl Into<String>, site_id: impl Into<String>, action: EventAction) -> Self {
        Self {
            username: username.into(),
            site_id: site_id.into(),
            action,
            timestamp: None,
            metadata: EventMetadata::default(),
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

/// Filter for reading the event log. Results are always ordered by timestamp.
#[derive(Debug, Clone)]
pub struct EventQuery {
    pub username: String,
    pub site_id: Option<String>,
    pub direction: SortDirection,
    pub limit: Option<i64>,
}

impl EventQuery {
    pub fn for_user(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            site_id: None,
            direction: SortDirection::Asc,
            limit: None,
        }
    }

    pub fn site(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: Option<i64>) -> Self {
        self.limit = limit;
        self
    }
}
