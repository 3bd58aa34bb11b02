//! Wire shapes for the JSON API.
//!
//! # Responsibility
//! - Map camelCase request bodies onto core drafts, and stored records back out.
//! - Convert between wire dates and epoch milliseconds.
//!
//! # Invariants
//! - Absent fields in an update keep the stored value.
//! - An empty date string clears the date.

use crate::error::ApiError;
use auratasks_core::{
    Goal, GoalDraft, GoalKind, GoalStatus, OrderAssignment, Registration, Task, TaskDraft,
    TaskPriority, TaskStatus, UserProfile,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(rename = "photoURL")]
    pub photo_url: Option<String>,
    pub password: Option<String>,
    pub is_google_user: Option<bool>,
}

impl From<RegisterRequest> for Registration {
    fn from(value: RegisterRequest) -> Self {
        Self {
            email: value.email.unwrap_or_default(),
            display_name: value.display_name.unwrap_or_default(),
            first_name: value.first_name.unwrap_or_default(),
            last_name: value.last_name.unwrap_or_default(),
            photo_url: value.photo_url,
            password: value.password,
            is_google_user: value.is_google_user.unwrap_or(false),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: &'static str,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Body of task create and update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
}

impl TaskRequest {
    /// Draft for a new task; title and status are mandatory.
    pub fn into_new_draft(self) -> Result<TaskDraft, ApiError> {
        let (Some(title), Some(status)) = (self.title, self.status) else {
            return Err(ApiError::bad_request("Title and status are required"));
        };
        Ok(TaskDraft {
            title,
            description: self.description,
            status,
            due_date: parse_optional_date(self.due_date.as_deref())?,
            priority: self.priority,
        })
    }

    /// Draft that overlays the provided fields on `current`.
    pub fn merge_into(self, current: &Task) -> Result<TaskDraft, ApiError> {
        Ok(TaskDraft {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self.description.or_else(|| current.description.clone()),
            status: self.status.unwrap_or(current.status),
            due_date: match self.due_date.as_deref() {
                Some(raw) => parse_optional_date(Some(raw))?,
                None => current.due_date,
            },
            priority: self.priority.or(current.priority),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub tasks: Vec<OrderAssignment>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub email: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<String>,
    pub priority: Option<TaskPriority>,
    pub order: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            email: task.owner,
            title: task.title,
            description: task.description,
            status: task.status,
            due_date: task.due_date.map(format_date),
            priority: task.priority,
            order: task.sort_order,
            created_at: format_date(task.created_at),
            updated_at: format_date(task.updated_at),
        }
    }
}

/// Body of goal create and update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GoalRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<GoalKind>,
    pub target_date: Option<String>,
    pub status: Option<GoalStatus>,
}

impl GoalRequest {
    /// Draft for a new goal; title, type and status are mandatory.
    pub fn into_new_draft(self) -> Result<GoalDraft, ApiError> {
        let (Some(title), Some(kind), Some(status)) = (self.title, self.kind, self.status) else {
            return Err(ApiError::bad_request("Title, type, and status are required"));
        };
        Ok(GoalDraft {
            title,
            description: self.description,
            kind,
            target_date: parse_optional_date(self.target_date.as_deref())?,
            status,
        })
    }

    pub fn merge_into(self, current: &Goal) -> Result<GoalDraft, ApiError> {
        Ok(GoalDraft {
            title: self.title.unwrap_or_else(|| current.title.clone()),
            description: self.description.or_else(|| current.description.clone()),
            kind: self.kind.unwrap_or(current.kind),
            target_date: match self.target_date.as_deref() {
                Some(raw) => parse_optional_date(Some(raw))?,
                None => current.target_date,
            },
            status: self.status.unwrap_or(current.status),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub id: Uuid,
    pub email: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target_date: Option<String>,
    pub status: GoalStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Goal> for GoalResponse {
    fn from(goal: Goal) -> Self {
        Self {
            id: goal.id,
            email: goal.owner,
            title: goal.title,
            description: goal.description,
            kind: goal.kind,
            target_date: goal.target_date.map(format_date),
            status: goal.status,
            created_at: format_date(goal.created_at),
            updated_at: format_date(goal.updated_at),
        }
    }
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date (midnight UTC) to epoch ms.
pub fn parse_date(raw: &str) -> Result<i64, ApiError> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.timestamp_millis());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc().timestamp_millis())
        .ok_or_else(|| ApiError::bad_request(format!("invalid date: {raw}")))
}

fn parse_optional_date(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

/// Formats epoch ms as RFC 3339 UTC with millisecond precision.
pub fn format_date(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::{format_date, parse_date, TaskRequest};
    use auratasks_core::{TaskPriority, TaskStatus};

    #[test]
    fn parse_date_accepts_rfc3339_and_plain_dates() {
        assert_eq!(parse_date("2024-07-01").unwrap(), 1_719_792_000_000);
        assert_eq!(
            parse_date("2024-07-01T02:00:00+02:00").unwrap(),
            1_719_792_000_000
        );
        assert!(parse_date("next tuesday").is_err());
    }

    #[test]
    fn format_date_emits_utc_millis() {
        assert_eq!(format_date(1_719_792_000_000), "2024-07-01T00:00:00.000Z");
    }

    #[test]
    fn task_request_uses_wire_names() {
        let request: TaskRequest = serde_json::from_str(
            r#"{"title":"Plan","status":"In Progress","dueDate":"2024-07-01","priority":"High"}"#,
        )
        .unwrap();
        let draft = request.into_new_draft().unwrap();
        assert_eq!(draft.status, TaskStatus::InProgress);
        assert_eq!(draft.priority, Some(TaskPriority::High));
        assert_eq!(draft.due_date, Some(1_719_792_000_000));
    }

    #[test]
    fn new_task_requires_title_and_status() {
        let request: TaskRequest = serde_json::from_str(r#"{"title":"Plan"}"#).unwrap();
        let err = request.into_new_draft().unwrap_err();
        assert_eq!(err.to_string(), "Title and status are required");
    }
}
