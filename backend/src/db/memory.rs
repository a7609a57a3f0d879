//! In-process stand-ins for the Postgres stores, used by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::db::{EventLog, UserDirectory};
use crate::error::{AppError, AppResult};
use crate::models::event::{Event, EventAction, EventQuery, NewEvent, SortDirection};
use crate::models::user::{NewTrackedSite, TrackedSite, User};

#[derive(Default)]
pub struct MemoryEventLog {
    events: RwLock<Vec<Event>>,
}

impl MemoryEventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }
}

#[async_trait]
impl EventLog for MemoryEventLog {
    async fn append(&self, event: NewEvent) -> AppResult<Uuid> {
        let id = Uuid::new_v4();
        self.events.write().await.push(Event {
            id,
            username: event.username,
            site_id: event.site_id,
            action: event.action,
            timestamp: event.timestamp.unwrap_or_else(Utc::now),
            metadata: event.metadata,
        });
        Ok(id)
    }

    async fn list(&self, query: &EventQuery) -> AppResult<Vec<Event>> {
        let events = self.events.read().await;
        let mut matched: Vec<Event> = events
            .iter()
            .filter(|e| e.username == query.username)
            .filter(|e| query.site_id.as_ref().map_or(true, |s| &e.site_id == s))
            .cloned()
            .collect();

        // Stable sort keeps insertion order for equal timestamps.
        matched.sort_by_key(|e| e.timestamp);
        if query.direction == SortDirection::Desc {
            matched.reverse();
        }
        if let Some(limit) = query.limit {
            matched.truncate(limit.max(0) as usize);
        }
        Ok(matched)
    }

    async fn most_recent(
        &self,
        username: &str,
        site_id: Option<&str>,
        action: Option<EventAction>,
    ) -> AppResult<Option<Event>> {
        let events = self.events.read().await;
        Ok(events
            .iter()
            .filter(|e| e.username == username)
            .filter(|e| site_id.map_or(true, |s| e.site_id == s))
            .filter(|e| action.map_or(true, |a| e.action == a))
            .max_by_key(|e| e.timestamp)
            .cloned())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryUserDirectory {
    users: RwLock<HashMap<String, (User, Vec<TrackedSite>)>>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_or_create(&self, username: &str) -> AppResult<User> {
        let mut users = self.users.write().await;
        let (user, _) = users.entry(username.to_string()).or_insert_with(|| {
            (
                User {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    email: None,
                    created_at: Utc::now(),
                },
                Vec::new(),
            )
        });
        Ok(user.clone())
    }

    async fn tracked_sites(&self, username: &str) -> AppResult<Vec<TrackedSite>> {
        let users = self.users.read().await;
        Ok(users
            .get(username)
            .map(|(_, sites)| sites.clone())
            .unwrap_or_default())
    }

    async fn tracked_site(&self, username: &str, site_id: &str) -> AppResult<Option<TrackedSite>> {
        let users = self.users.read().await;
        Ok(users
            .get(username)
            .and_then(|(_, sites)| sites.iter().find(|s| s.site_id == site_id).cloned()))
    }

    async fn add_tracked_site(&self, username: &str, site: NewTrackedSite) -> AppResult<TrackedSite> {
        self.find_or_create(username).await?;

        let mut users = self.users.write().await;
        let sites = users
            .get_mut(username)
            .map(|(_, sites)| sites)
            .ok_or_else(|| AppError::NotFound("User not found".into()))?;

        if sites.iter().any(|s| s.site_id == site.site_id) {
            return Err(AppError::Conflict(format!(
                "Site '{}' is already tracked",
                site.site_id
            )));
        }

        let tracked = TrackedSite {
            site_id: site.site_id,
            url: site.url,
            label: site.label,
            created_at: Utc::now(),
            is_active: true,
        };
        sites.push(tracked.clone());
        Ok(tracked)
    }
}
