//! Ordered task storage.
//!
//! # Responsibility
//! - Persist per-owner tasks and maintain their `sort_order` column.
//! - Run append, delete+compaction and batch reorder as single transactions.
//!
//! # Invariants
//! - Listing is deterministic: `sort_order ASC, created_at ASC, rowid ASC`.
//! - Append reads the owner's max order under the store write lock, so two
//!   concurrent appends never receive the same order.
//! - Delete and its compaction commit together or not at all.
//! - Reorder verifies ownership of every id before the first write.

use super::{ensure_connection_ready, parse_uuid, RepoError, RepoResult};
use crate::model::task::{OrderAssignment, Task, TaskDraft, TaskId, TaskPriority, TaskStatus};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const TASK_SELECT_SQL: &str = "SELECT
    task_uuid,
    owner_email,
    title,
    description,
    status,
    due_date,
    priority,
    sort_order,
    created_at,
    updated_at
FROM tasks";

const TASK_COLUMNS: &[&str] = &[
    "task_uuid",
    "owner_email",
    "title",
    "description",
    "status",
    "due_date",
    "priority",
    "sort_order",
    "created_at",
    "updated_at",
];

/// Repository interface for one store of owner-partitioned, ordered tasks.
pub trait TaskRepository {
    /// Inserts `draft` at the end of `owner`'s list.
    fn append_task(&self, owner: &str, draft: &TaskDraft) -> RepoResult<Task>;
    /// Loads one task if it exists and belongs to `owner`.
    fn get_task(&self, owner: &str, id: TaskId) -> RepoResult<Option<Task>>;
    /// Lists `owner`'s tasks in display order.
    fn list_tasks(&self, owner: &str) -> RepoResult<Vec<Task>>;
    /// Replaces payload fields; order and owner stay untouched.
    fn update_task(&self, owner: &str, id: TaskId, draft: &TaskDraft) -> RepoResult<Task>;
    /// Removes one task and shifts every later task of `owner` down by one.
    fn delete_task(&self, owner: &str, id: TaskId) -> RepoResult<()>;
    /// Applies `(id, order)` pairs verbatim after checking ownership of all ids.
    fn reorder_tasks(&self, owner: &str, assignments: &[OrderAssignment]) -> RepoResult<()>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }

    fn begin_immediate(&self) -> RepoResult<Transaction<'conn>> {
        Ok(Transaction::new_unchecked(
            self.conn,
            TransactionBehavior::Immediate,
        )?)
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn append_task(&self, owner: &str, draft: &TaskDraft) -> RepoResult<Task> {
        let id = Uuid::new_v4();
        let tx = self.begin_immediate()?;

        let sort_order = next_sort_order(&tx, owner)?;
        tx.execute(
            "INSERT INTO tasks (
                task_uuid,
                owner_email,
                title,
                description,
                status,
                due_date,
                priority,
                sort_order
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
            params![
                id.to_string(),
                owner,
                draft.title.as_str(),
                draft.description.as_deref(),
                task_status_to_db(draft.status),
                draft.due_date,
                draft.priority.map(task_priority_to_db),
                sort_order,
            ],
        )?;
        let task = load_task(&tx, owner, id)?.ok_or(RepoError::NotFound(id))?;

        tx.commit()?;
        Ok(task)
    }

    fn get_task(&self, owner: &str, id: TaskId) -> RepoResult<Option<Task>> {
        load_task(self.conn, owner, id)
    }

    fn list_tasks(&self, owner: &str) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL}
             WHERE owner_email = ?1
             ORDER BY sort_order ASC, created_at ASC, rowid ASC;"
        ))?;
        let mut rows = stmt.query([owner])?;

        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    fn update_task(&self, owner: &str, id: TaskId, draft: &TaskDraft) -> RepoResult<Task> {
        let tx = self.begin_immediate()?;
        let changed = tx.execute(
            "UPDATE tasks
             SET title = ?3,
                 description = ?4,
                 status = ?5,
                 due_date = ?6,
                 priority = ?7,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE task_uuid = ?1
               AND owner_email = ?2;",
            params![
                id.to_string(),
                owner,
                draft.title.as_str(),
                draft.description.as_deref(),
                task_status_to_db(draft.status),
                draft.due_date,
                draft.priority.map(task_priority_to_db),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let task = load_task(&tx, owner, id)?.ok_or(RepoError::NotFound(id))?;
        tx.commit()?;
        Ok(task)
    }

    fn delete_task(&self, owner: &str, id: TaskId) -> RepoResult<()> {
        let tx = self.begin_immediate()?;

        let removed_order: Option<i64> = tx
            .query_row(
                "SELECT sort_order
                 FROM tasks
                 WHERE task_uuid = ?1
                   AND owner_email = ?2;",
                params![id.to_string(), owner],
                |row| row.get(0),
            )
            .optional()?;
        let Some(removed_order) = removed_order else {
            return Err(RepoError::NotFound(id));
        };

        tx.execute(
            "DELETE FROM tasks
             WHERE task_uuid = ?1
               AND owner_email = ?2;",
            params![id.to_string(), owner],
        )?;
        tx.execute(
            "UPDATE tasks
             SET sort_order = sort_order - 1,
                 updated_at = (strftime('%s', 'now') * 1000)
             WHERE owner_email = ?1
               AND sort_order > ?2;",
            params![owner, removed_order],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn reorder_tasks(&self, owner: &str, assignments: &[OrderAssignment]) -> RepoResult<()> {
        let tx = self.begin_immediate()?;

        let mut unknown = Vec::new();
        {
            let mut owned = tx.prepare(
                "SELECT EXISTS(
                    SELECT 1
                    FROM tasks
                    WHERE task_uuid = ?1
                      AND owner_email = ?2
                );",
            )?;
            for assignment in assignments {
                let exists: i64 =
                    owned.query_row(params![assignment.id.to_string(), owner], |row| row.get(0))?;
                if exists != 1 {
                    unknown.push(assignment.id);
                }
            }
        }
        if !unknown.is_empty() {
            return Err(RepoError::UnknownIds(unknown));
        }

        {
            let mut update = tx.prepare(
                "UPDATE tasks
                 SET sort_order = ?3,
                     updated_at = (strftime('%s', 'now') * 1000)
                 WHERE task_uuid = ?1
                   AND owner_email = ?2;",
            )?;
            for assignment in assignments {
                update.execute(params![assignment.id.to_string(), owner, assignment.order])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}

fn next_sort_order(conn: &Connection, owner: &str) -> RepoResult<i64> {
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(sort_order)
         FROM tasks
         WHERE owner_email = ?1;",
        [owner],
        |row| row.get(0),
    )?;
    match max {
        None => Ok(0),
        Some(max) => max.checked_add(1).ok_or_else(|| {
            RepoError::InvalidData(format!("tasks.sort_order {max} leaves no room to append"))
        }),
    }
}

fn load_task(conn: &Connection, owner: &str, id: TaskId) -> RepoResult<Option<Task>> {
    let mut stmt = conn.prepare(&format!(
        "{TASK_SELECT_SQL}
         WHERE task_uuid = ?1
           AND owner_email = ?2;"
    ))?;
    let mut rows = stmt.query(params![id.to_string(), owner])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_task_row(row)?));
    }
    Ok(None)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let id_text: String = row.get("task_uuid")?;
    let id = parse_uuid(&id_text, "tasks.task_uuid")?;

    let status_text: String = row.get("status")?;
    let status = parse_task_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;

    let priority = row
        .get::<_, Option<String>>("priority")?
        .map(|value| {
            parse_task_priority(&value).ok_or_else(|| {
                RepoError::InvalidData(format!("invalid priority `{value}` in tasks.priority"))
            })
        })
        .transpose()?;

    Ok(Task {
        id,
        owner: row.get("owner_email")?,
        title: row.get("title")?,
        description: row.get("description")?,
        status,
        due_date: row.get("due_date")?,
        priority,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

fn task_status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "todo",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Done => "done",
    }
}

fn parse_task_status(value: &str) -> Option<TaskStatus> {
    match value {
        "todo" => Some(TaskStatus::Todo),
        "in_progress" => Some(TaskStatus::InProgress),
        "done" => Some(TaskStatus::Done),
        _ => None,
    }
}

fn task_priority_to_db(priority: TaskPriority) -> &'static str {
    match priority {
        TaskPriority::Low => "low",
        TaskPriority::Medium => "medium",
        TaskPriority::High => "high",
    }
}

fn parse_task_priority(value: &str) -> Option<TaskPriority> {
    match value {
        "low" => Some(TaskPriority::Low),
        "medium" => Some(TaskPriority::Medium),
        "high" => Some(TaskPriority::High),
        _ => None,
    }
}
