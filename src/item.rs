use crate::cadence::TrainingCadence;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A training article tracked in a team's library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
    #[serde(default)]
    pub assigned_tags: Vec<String>,
    #[serde(default)]
    pub cadence: TrainingCadence,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scheduled_due_date: Option<DateTime<Utc>>,
}

impl TrainingItem {
    pub fn new(name: impl Into<String>, cadence: TrainingCadence) -> Self {
        Self {
            id: None,
            name: name.into(),
            topic: None,
            team_id: None,
            assigned_tags: Vec::new(),
            cadence,
            created_at: None,
            last_completed_at: None,
            scheduled_due_date: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_completed(&self) -> bool {
        self.last_completed_at.is_some()
    }

    /// Next due date for this item relative to `now`.
    pub fn next_due_date(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        crate::due_date::resolve(
            self.last_completed_at,
            self.cadence,
            self.scheduled_due_date,
            now,
        )
    }
}
