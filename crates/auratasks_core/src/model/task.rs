//! Task domain model.
//!
//! # Responsibility
//! - Define the per-owner task record and its input draft.
//! - Describe client-supplied order assignments for batch reorder.
//!
//! # Invariants
//! - `title` is non-blank after trimming.
//! - `sort_order` is assigned by the store, never by a draft.
//! - For one owner, `sort_order` values form `0..n-1` outside of a loose reorder.

use super::normalize_optional_text;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable task identifier, generated on append.
pub type TaskId = Uuid;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[default]
    #[serde(rename = "To Do")]
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Done")]
    Done,
}

/// Optional urgency marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Caller input for creating or replacing a task's payload.
///
/// Carries no id, owner or order: those belong to the ordered collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// Unix epoch milliseconds.
    pub due_date: Option<i64>,
    pub priority: Option<TaskPriority>,
}

impl TaskDraft {
    /// Creates a draft with only a title; everything else takes defaults.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Validates and normalizes text fields.
    ///
    /// Titles and descriptions are trimmed; a blank description becomes `None`.
    pub fn normalized(self) -> Result<Self, TaskValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(TaskValidationError::BlankTitle);
        }
        Ok(Self {
            title,
            description: normalize_optional_text(self.description),
            ..self
        })
    }
}

/// Stored task as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: TaskId,
    pub owner: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<i64>,
    pub priority: Option<TaskPriority>,
    /// Position within the owner's list.
    pub sort_order: i64,
    /// Epoch ms.
    pub created_at: i64,
    /// Epoch ms.
    pub updated_at: i64,
}

/// One `(id, order)` pair of a batch reorder request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAssignment {
    pub id: TaskId,
    pub order: i64,
}

impl OrderAssignment {
    pub fn new(id: TaskId, order: i64) -> Self {
        Self { id, order }
    }
}

/// Task payload rejected before reaching the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    BlankTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "task title must not be blank"),
        }
    }
}

impl Error for TaskValidationError {}

#[cfg(test)]
mod tests {
    use super::{TaskDraft, TaskStatus, TaskValidationError};

    #[test]
    fn normalized_trims_title_and_drops_blank_description() {
        let mut draft = TaskDraft::new("  write report ");
        draft.description = Some("   ".to_string());

        let normalized = draft.normalized().unwrap();
        assert_eq!(normalized.title, "write report");
        assert_eq!(normalized.description, None);
        assert_eq!(normalized.status, TaskStatus::Todo);
    }

    #[test]
    fn normalized_rejects_blank_title() {
        let err = TaskDraft::new(" \t").normalized().unwrap_err();
        assert_eq!(err, TaskValidationError::BlankTitle);
    }

    #[test]
    fn status_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let parsed: TaskStatus = serde_json::from_str("\"To Do\"").unwrap();
        assert_eq!(parsed, TaskStatus::Todo);
    }
}
