//! Goal domain model.
//!
//! Goals are flat per-owner records with no ordering invariant.

use super::normalize_optional_text;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable goal identifier.
pub type GoalId = Uuid;

/// Planning horizon of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalKind {
    Weekly,
    Monthly,
    Yearly,
}

/// Progress state of a goal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

/// Caller input for creating or replacing a goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    pub title: String,
    pub description: Option<String>,
    pub kind: GoalKind,
    /// Unix epoch milliseconds.
    pub target_date: Option<i64>,
    pub status: GoalStatus,
}

impl GoalDraft {
    pub fn new(title: impl Into<String>, kind: GoalKind) -> Self {
        Self {
            title: title.into(),
            description: None,
            kind,
            target_date: None,
            status: GoalStatus::default(),
        }
    }

    /// Trims text fields and rejects a blank title.
    pub fn normalized(self) -> Result<Self, GoalValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(GoalValidationError::BlankTitle);
        }
        Ok(Self {
            title,
            description: normalize_optional_text(self.description),
            ..self
        })
    }
}

/// Stored goal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    pub id: GoalId,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: GoalKind,
    pub target_date: Option<i64>,
    pub status: GoalStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    BlankTitle,
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "goal title must not be blank"),
        }
    }
}

impl Error for GoalValidationError {}
