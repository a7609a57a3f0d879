use serde::{Deserialize, Serialize};

/// Catalogue entry as stored in `badges.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub emoji: Option<String>,
    pub criteria: Option<BadgeCriteria>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BadgeCriteria {
    #[serde(rename = "type")]
    pub kind: String,
    pub threshold: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Absent on catalogue listings.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earned: Option<bool>,
    /// Earned on exactly the threshold day.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub newly: Option<bool>,
}
