//! Core domain logic for AuraTasks.
//! This crate is the single source of truth for business invariants: the
//! per-owner task ordering, ownership scoping, and credential handling.

pub mod auth;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use auth::token::{Claims, TokenError, TokenIssuer};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::goal::{Goal, GoalDraft, GoalId, GoalKind, GoalStatus};
pub use model::task::{OrderAssignment, Task, TaskDraft, TaskId, TaskPriority, TaskStatus};
pub use model::user::{Registration, UserProfile};
pub use repo::goal_repo::{GoalRepository, SqliteGoalRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::account_service::{AccountService, AccountServiceError, AuthSession};
pub use service::goal_service::{GoalService, GoalServiceError};
pub use service::task_service::{
    BatchRejection, TaskService, TaskServiceError, MAX_TASK_ORDER,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
