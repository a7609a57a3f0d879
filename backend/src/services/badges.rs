use anyhow::Context;

use crate::models::badge::{Badge, BadgeDefinition};

const STREAK_DAYS: &str = "streak_days";

static CATALOGUE_JSON: &str = include_str!("../../badges.json");

/// Badge definitions, parsed once at startup.
#[derive(Debug, Clone)]
pub struct BadgeCatalogue {
    definitions: Vec<BadgeDefinition>,
}

impl BadgeCatalogue {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_json(CATALOGUE_JSON)
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let definitions: Vec<BadgeDefinition> =
            serde_json::from_str(json).context("Failed to parse badge catalogue")?;
        Ok(Self { definitions })
    }

    fn streak_definitions(&self) -> impl Iterator<Item = &BadgeDefinition> {
        self.definitions
            .iter()
            .filter(|b| b.criteria.as_ref().is_some_and(|c| c.kind == STREAK_DAYS))
    }

    pub fn all_streak_badges(&self) -> Vec<Badge> {
        self.streak_definitions()
            .map(|def| to_badge(def, None))
            .collect()
    }

    /// Streak badges whose threshold `streak_days` has reached.
    pub fn earned_streak_badges(&self, streak_days: u32) -> Vec<Badge> {
        self.streak_definitions()
            .map(|def| to_badge(def, Some(streak_days)))
            .filter(|b| b.earned == Some(true))
            .collect()
    }
}

fn to_badge(def: &BadgeDefinition, streak_days: Option<u32>) -> Badge {
    let threshold = def.criteria.as_ref().and_then(|c| c.threshold);
    let (earned, newly) = match (threshold, streak_days) {
        (Some(t), Some(days)) => (Some(days >= t), Some(days == t)),
        (None, Some(_)) => (Some(false), Some(false)),
        (_, None) => (None, None),
    };

    Badge {
        id: def.id.clone(),
        title: def.title.clone(),
        description: def.description.clone(),
        threshold,
        emoji: def.emoji.clone(),
        earned,
        newly,
    }
}
