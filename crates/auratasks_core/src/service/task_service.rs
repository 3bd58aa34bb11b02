//! Ordered task collection use-case service.
//!
//! # Responsibility
//! - Expose append, update, delete, reorder and list over one owner's tasks.
//! - Validate caller input before anything reaches the store.
//! - Translate repository failures into the three caller-facing outcomes:
//!   not found, invalid batch, store unavailable.
//!
//! # Invariants
//! - Order values of an owner's tasks stay dense (`0..n-1`) across append and
//!   delete.
//! - A missing task and a task of another owner are reported identically.
//! - Reorder applies caller-supplied orders verbatim; it does not renumber
//!   unlisted tasks, so a partial batch can leave two tasks on one order.

use crate::model::task::{OrderAssignment, Task, TaskDraft, TaskId, TaskValidationError};
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use log::{error, info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Largest order a reorder may assign. Appends stay far below `i64::MAX`.
pub const MAX_TASK_ORDER: i64 = i32::MAX as i64;

/// Why a reorder batch was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchRejection {
    /// The same id appears more than once.
    DuplicateId(TaskId),
    /// An order value is below zero.
    NegativeOrder { id: TaskId, order: i64 },
    /// An order value is above `MAX_TASK_ORDER`.
    OrderTooLarge { id: TaskId, order: i64 },
    /// Some ids are missing or belong to another owner.
    UnknownOrForeignIds,
}

impl Display for BatchRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "task listed more than once: {id}"),
            Self::NegativeOrder { id, order } => {
                write!(f, "negative order {order} for task {id}")
            }
            Self::OrderTooLarge { id, order } => {
                write!(f, "order {order} for task {id} exceeds {MAX_TASK_ORDER}")
            }
            Self::UnknownOrForeignIds => write!(f, "Invalid task IDs or unauthorized"),
        }
    }
}

/// Errors from ordered task operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Draft failed field validation.
    InvalidTask(TaskValidationError),
    /// Task does not exist for this owner.
    NotFound(TaskId),
    /// Reorder batch refused before any write.
    InvalidBatch(BatchRejection),
    /// Store fault; the operation did not apply and may be retried.
    StoreUnavailable(RepoError),
}

impl TaskServiceError {
    /// Whether the caller may retry the same request.
    ///
    /// Retrying `append` after a store fault can still duplicate the task when
    /// the fault happened after commit; callers own that decision.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "task not found: {id}"),
            Self::InvalidBatch(reason) => write!(f, "invalid reorder batch: {reason}"),
            Self::StoreUnavailable(err) => write!(f, "task store unavailable: {err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTask(err) => Some(err),
            Self::StoreUnavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::UnknownIds(_) => Self::InvalidBatch(BatchRejection::UnknownOrForeignIds),
            other => Self::StoreUnavailable(other),
        }
    }
}

/// Ordered collection manager over an injected task repository.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Appends a task at the end of `owner`'s list.
    ///
    /// The first task of an owner gets order `0`; later ones get `max + 1`.
    pub fn append(&self, owner: &str, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let draft = draft.normalized()?;
        let task = self
            .repo
            .append_task(owner, &draft)
            .map_err(|err| failed("task_append", err))?;
        info!(
            "event=task_append module=task_service status=ok task_id={} order={}",
            task.id, task.sort_order
        );
        Ok(task)
    }

    /// Replaces a task's payload. Order is never changed here.
    pub fn update(
        &self,
        owner: &str,
        id: TaskId,
        draft: TaskDraft,
    ) -> Result<Task, TaskServiceError> {
        let draft = draft.normalized()?;
        self.repo
            .update_task(owner, id, &draft)
            .map_err(|err| failed("task_update", err))
    }

    /// Deletes a task and closes the gap it leaves.
    pub fn delete(&self, owner: &str, id: TaskId) -> Result<(), TaskServiceError> {
        self.repo
            .delete_task(owner, id)
            .map_err(|err| failed("task_delete", err))?;
        info!("event=task_delete module=task_service status=ok task_id={id}");
        Ok(())
    }

    /// Applies a batch of `(id, order)` pairs as one unit.
    ///
    /// Rejects duplicate ids, negative orders and ids the owner does not own
    /// before writing anything. An empty batch succeeds without touching the store.
    pub fn reorder(
        &self,
        owner: &str,
        assignments: &[OrderAssignment],
    ) -> Result<(), TaskServiceError> {
        if let Err(reason) = check_batch_shape(assignments) {
            warn!("event=task_reorder module=task_service status=rejected reason=\"{reason}\"");
            return Err(TaskServiceError::InvalidBatch(reason));
        }
        if assignments.is_empty() {
            return Ok(());
        }

        self.repo
            .reorder_tasks(owner, assignments)
            .map_err(|err| failed("task_reorder", err))?;
        info!(
            "event=task_reorder module=task_service status=ok count={}",
            assignments.len()
        );
        Ok(())
    }

    /// Lists `owner`'s tasks ascending by order.
    pub fn list(&self, owner: &str) -> Result<Vec<Task>, TaskServiceError> {
        self.repo
            .list_tasks(owner)
            .map_err(|err| failed("task_list", err))
    }

    /// Loads one task of `owner`.
    pub fn get(&self, owner: &str, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(owner, id)
            .map_err(|err| failed("task_get", err))?
            .ok_or(TaskServiceError::NotFound(id))
    }
}

fn check_batch_shape(assignments: &[OrderAssignment]) -> Result<(), BatchRejection> {
    let mut seen = HashSet::with_capacity(assignments.len());
    for assignment in assignments {
        if assignment.order < 0 {
            return Err(BatchRejection::NegativeOrder {
                id: assignment.id,
                order: assignment.order,
            });
        }
        if assignment.order > MAX_TASK_ORDER {
            return Err(BatchRejection::OrderTooLarge {
                id: assignment.id,
                order: assignment.order,
            });
        }
        if !seen.insert(assignment.id) {
            return Err(BatchRejection::DuplicateId(assignment.id));
        }
    }
    Ok(())
}

fn failed(event: &'static str, err: RepoError) -> TaskServiceError {
    if err.is_busy() {
        warn!("event={event} module=task_service status=error reason=busy error={err}");
    } else if err.is_store_fault() {
        error!("event={event} module=task_service status=error error={err}");
    } else {
        warn!("event={event} module=task_service status=rejected error={err}");
    }
    err.into()
}

#[cfg(test)]
mod tests {
    use super::{check_batch_shape, BatchRejection, MAX_TASK_ORDER};
    use crate::model::task::OrderAssignment;
    use uuid::Uuid;

    #[test]
    fn batch_shape_accepts_distinct_non_negative_pairs() {
        let batch = [
            OrderAssignment::new(Uuid::new_v4(), 1),
            OrderAssignment::new(Uuid::new_v4(), 0),
        ];
        assert!(check_batch_shape(&batch).is_ok());
        assert!(check_batch_shape(&[]).is_ok());
    }

    #[test]
    fn batch_shape_rejects_repeated_id() {
        let id = Uuid::new_v4();
        let batch = [OrderAssignment::new(id, 0), OrderAssignment::new(id, 1)];
        assert_eq!(
            check_batch_shape(&batch),
            Err(BatchRejection::DuplicateId(id))
        );
    }

    #[test]
    fn batch_shape_rejects_negative_order() {
        let id = Uuid::new_v4();
        let batch = [OrderAssignment::new(id, -1)];
        assert_eq!(
            check_batch_shape(&batch),
            Err(BatchRejection::NegativeOrder { id, order: -1 })
        );
    }

    #[test]
    fn batch_shape_caps_order_values() {
        let id = Uuid::new_v4();
        assert!(check_batch_shape(&[OrderAssignment::new(id, MAX_TASK_ORDER)]).is_ok());
        assert_eq!(
            check_batch_shape(&[OrderAssignment::new(id, i64::MAX)]),
            Err(BatchRejection::OrderTooLarge {
                id,
                order: i64::MAX
            })
        );
    }
}
