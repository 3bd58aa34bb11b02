use super::{json_body, path_id};
use crate::auth::AuthUser;
use crate::dto::{MessageResponse, ReorderRequest, TaskRequest, TaskResponse};
use crate::error::ApiError;
use crate::state::SharedState;
use auratasks_core::{SqliteTaskRepository, TaskService};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;

const NOT_FOUND: &str = "Task not found";

fn service(conn: &Connection) -> Result<TaskService<SqliteTaskRepository<'_>>, ApiError> {
    Ok(TaskService::new(SqliteTaskRepository::try_new(conn)?))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let draft = json_body(payload)?.into_new_draft()?;
    let task = state
        .with_store(move |conn| Ok(service(conn)?.append(&owner, draft)?))
        .await?;
    Ok((StatusCode::CREATED, Json(task.into())))
}

pub(super) async fn list(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state
        .with_store(move |conn| Ok(service(conn)?.list(&owner)?))
        .await?;
    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<TaskRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = path_id(&id, NOT_FOUND)?;
    let request = json_body(payload)?;
    let task = state
        .with_store(move |conn| {
            let service = service(conn)?;
            let current = service.get(&owner, id)?;
            let draft = request.merge_into(&current)?;
            Ok(service.update(&owner, id, draft)?)
        })
        .await?;
    Ok(Json(task.into()))
}

pub(super) async fn delete(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = path_id(&id, NOT_FOUND)?;
    state
        .with_store(move |conn| Ok(service(conn)?.delete(&owner, id)?))
        .await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}

pub(super) async fn reorder(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<ReorderRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request = json_body(payload)?;
    state
        .with_store(move |conn| Ok(service(conn)?.reorder(&owner, &request.tasks)?))
        .await?;
    Ok(Json(MessageResponse::new("Tasks reordered successfully")))
}
