//! # Soft-block API: request/response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Field validation is expressed via `validator` derive macros

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::badge::Badge;
use crate::models::event::{EventAction, SortDirection};
use crate::models::user::NewTrackedSite;

// ============================================================================
// Tracked sites
// ============================================================================

/// POST /api/users/{user}/sites
#[derive(Debug, Deserialize, Validate)]
pub struct AddTrackedSiteRequest {
    #[validate(length(min = 1, max = 64, message = "Site id must be 1-64 characters"))]
    pub site_id: String,

    #[validate(length(min = 1, max = 2048, message = "URL must be 1-2048 characters"))]
    pub url: String,

    /// Human-friendly name. Default: the site id
    #[validate(length(min = 1, max = 100, message = "Label must be 1-100 characters"))]
    pub label: Option<String>,
}

impl From<AddTrackedSiteRequest> for NewTrackedSite {
    fn from(req: AddTrackedSiteRequest) -> Self {
        let label = req.label.unwrap_or_else(|| req.site_id.clone());
        Self {
            site_id: req.site_id,
            url: req.url,
            label,
        }
    }
}

// ============================================================================
// Interstitial
// ============================================================================

/// GET /api/users/{user}/block/{site}
#[derive(Debug, Default, Deserialize)]
pub struct InterstitialQuery {
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InterstitialResponse {
    pub username: String,
    pub site_id: String,
    pub url: String,
    pub label: String,
    pub view_event_id: Uuid,
    pub streak_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure_at: Option<DateTime<Utc>>,
}

/// What the user chose on the block page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Proceed to the blocked site.
    Visit,
    /// Stay focused and close the tab.
    Stay,
}

impl Decision {
    pub fn action(self) -> EventAction {
        match self {
            Decision::Visit => EventAction::Fail,
            Decision::Stay => EventAction::Resist,
        }
    }
}

/// POST /api/users/{user}/block/{site}
#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub action: Decision,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub event_id: Uuid,
    pub action: EventAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
}

// ============================================================================
// Events
// ============================================================================

/// GET /api/users/{user}/events
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EventListQuery {
    pub site_id: Option<String>,

    /// Timestamp order. Default: desc (newest first)
    pub order: Option<SortDirection>,

    #[validate(range(min = 1, max = 1000, message = "Limit must be 1-1000"))]
    pub limit: Option<i64>,
}

/// GET /api/users/{user}/events/latest
#[derive(Debug, Default, Deserialize)]
pub struct LatestEventQuery {
    pub site_id: Option<String>,
    pub action: Option<EventAction>,
}

// ============================================================================
// Badges
// ============================================================================

/// GET /api/users/{user}/badges
#[derive(Debug, Serialize)]
pub struct EarnedBadgesResponse {
    pub username: String,
    pub streak_days: u32,
    pub badges: Vec<Badge>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_site_request_validates_lengths() {
        let ok = AddTrackedSiteRequest {
            site_id: "imgur".into(),
            url: "https://imgur.com".into(),
            label: None,
        };
        assert!(ok.validate().is_ok());

        let empty_id = AddTrackedSiteRequest {
            site_id: String::new(),
            url: "https://imgur.com".into(),
            label: None,
        };
        assert!(empty_id.validate().is_err());

        let long_label = AddTrackedSiteRequest {
            site_id: "imgur".into(),
            url: "https://imgur.com".into(),
            label: Some("x".repeat(101)),
        };
        assert!(long_label.validate().is_err());
    }

    #[test]
    fn label_defaults_to_site_id() {
        let site: NewTrackedSite = AddTrackedSiteRequest {
            site_id: "imgur".into(),
            url: "https://imgur.com".into(),
            label: None,
        }
        .into();
        assert_eq!(site.label, "imgur");
    }

    #[test]
    fn decision_maps_to_action() {
        let req: DecisionRequest = serde_json::from_str(r#"{"action": "visit"}"#).unwrap();
        assert_eq!(req.action.action(), EventAction::Fail);

        let req: DecisionRequest = serde_json::from_str(r#"{"action": "stay"}"#).unwrap();
        assert_eq!(req.action.action(), EventAction::Resist);

        assert!(serde_json::from_str::<DecisionRequest>(r#"{"action": "maybe"}"#).is_err());
    }

    #[test]
    fn event_limit_is_bounded() {
        let query = EventListQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(query.validate().is_err());

        let query = EventListQuery {
            limit: Some(50),
            ..Default::default()
        };
        assert!(query.validate().is_ok());
    }
}
