//! Goal storage.
//!
//! # Invariants
//! - Every statement filters on `owner_email`.
//! - Listing follows creation order: `created_at ASC, rowid ASC`.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::goal::{Goal, GoalDraft, GoalId, GoalKind, GoalStatus};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const GOAL_SELECT_SQL: &str = "SELECT
    goal_uuid,
    owner_email,
    title,
    description,
    kind,
    target_date,
    status,
    created_at,
    updated_at
FROM goals";

const GOAL_COLUMNS: &[&str] = &[
    "goal_uuid",
    "owner_email",
    "title",
    "description",
    "kind",
    "target_date",
    "status",
    "created_at",
    "updated_at",
];

/// Repository interface for per-owner goals.
pub trait GoalRepository {
    fn create_goal(&self, owner: &str, draft: &GoalDraft) -> RepoResult<Goal>;
    fn get_goal(&self, owner: &str, id: GoalId) -> RepoResult<Option<Goal>>;
    fn list_goals(&self, owner: &str) -> RepoResult<Vec<Goal>>;
    fn update_goal(&self, owner: &str, id: GoalId, draft: &GoalDraft) -> RepoResult<Goal>;
    fn delete_goal(&self, owner: &str, id: GoalId) -> RepoResult<()>;
}

/// SQLite-backed goal repository.
pub struct SqliteGoalRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteGoalRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "goals", GOAL_COLUMNS)?;
        Ok(Self { conn })
    }

    fn load_required(&self, owner: &str, id: GoalId) -> RepoResult<Goal> {
        self.get_goal(owner, id)?.ok_or(RepoError::NotFound(id))
    }
}

impl GoalRepository for SqliteGoalRepository<'_> {
    fn create_goal(&self, owner: &str, draft: &GoalDraft) -> RepoResult<Goal> {
        let id = Uuid::new_v4();
        self.conn.execute(
            "INSERT INTO goals (
                goal_uuid,
                owner_email,
                title,
                description,
                kind,
                target_date,
                status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            params![
                id.to_string(),
                owner,
                draft.title.as_str(),
                draft.description.as_deref(),
                goal_kind_to_db(draft.kind),
                draft.target_date,
                goal_status_to_db(draft.status),
            ],
        )?;
        self.load_required(owner, id)
    }

    fn get_goal(&self, owner: &str, id: GoalId) -> RepoResult<Option<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE goal_uuid = ?1
               AND owner_email = ?2;"
        ))?;
        let mut rows = stmt.query(params![id.to_string(), owner])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_goal_row(row)?));
        }
        Ok(None)
    }

    fn list_goals(&self, owner: &str) -> RepoResult<Vec<Goal>> {
        let mut stmt = self.conn.prepare(&format!(
            "{GOAL_SELECT_SQL}
             WHERE owner_email = ?1
             ORDER BY created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([owner])?;
        let mut goals = Vec::new();
        while let Some(row) = rows.next()? {
            goals.push(parse_goal_row(row)?);
        }
        Ok(goals)
    }

    fn update_goal(&self, owner: &str, id: GoalId, draft: &GoalDraft) -> RepoResult<Goal> {
        let changed = self.conn.execute(
            "UPDATE goals
             SET title = ?3,
                 description = ?4,
                 kind = ?5,
                 target_date = ?6,
                 status = ?7,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE goal_uuid = ?1
               AND owner_email = ?2;",
            params![
                id.to_string(),
                owner,
                draft.title.as_str(),
                draft.description.as_deref(),
                goal_kind_to_db(draft.kind),
                draft.target_date,
                goal_status_to_db(draft.status),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        self.load_required(owner, id)
    }

    fn delete_goal(&self, owner: &str, id: GoalId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM goals
             WHERE goal_uuid = ?1
               AND owner_email = ?2;",
            params![id.to_string(), owner],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_goal_row(row: &Row<'_>) -> RepoResult<Goal> {
    let id_text: String = row.get("goal_uuid")?;
    let kind_text: String = row.get("kind")?;
    let status_text: String = row.get("status")?;

    Ok(Goal {
        id: parse_uuid(&id_text, "goals.goal_uuid")?,
        owner: row.get("owner_email")?,
        title: row.get("title")?,
        description: row.get("description")?,
        kind: parse_goal_kind(&kind_text).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid goal kind `{kind_text}` in goals.kind"))
        })?,
        target_date: row.get("target_date")?,
        status: parse_goal_status(&status_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid goal status `{status_text}` in goals.status"
            ))
        })?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn goal_kind_to_db(kind: GoalKind) -> &'static str {
    match kind {
        GoalKind::Weekly => "weekly",
        GoalKind::Monthly => "monthly",
        GoalKind::Yearly => "yearly",
    }
}

fn parse_goal_kind(value: &str) -> Option<GoalKind> {
    match value {
        "weekly" => Some(GoalKind::Weekly),
        "monthly" => Some(GoalKind::Monthly),
        "yearly" => Some(GoalKind::Yearly),
        _ => None,
    }
}

fn goal_status_to_db(status: GoalStatus) -> &'static str {
    match status {
        GoalStatus::NotStarted => "not_started",
        GoalStatus::InProgress => "in_progress",
        GoalStatus::Completed => "completed",
    }
}

fn parse_goal_status(value: &str) -> Option<GoalStatus> {
    match value {
        "not_started" => Some(GoalStatus::NotStarted),
        "in_progress" => Some(GoalStatus::InProgress),
        "completed" => Some(GoalStatus::Completed),
        _ => None,
    }
}
