use super::{json_body, path_id};
use crate::auth::AuthUser;
use crate::dto::{GoalRequest, GoalResponse, MessageResponse};
use crate::error::ApiError;
use crate::state::SharedState;
use auratasks_core::{GoalService, SqliteGoalRepository};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::Connection;

const NOT_FOUND: &str = "Goal not found";

fn service(conn: &Connection) -> Result<GoalService<SqliteGoalRepository<'_>>, ApiError> {
    Ok(GoalService::new(SqliteGoalRepository::try_new(conn)?))
}

pub(super) async fn create(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<GoalRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GoalResponse>), ApiError> {
    let draft = json_body(payload)?.into_new_draft()?;
    let goal = state
        .with_store(move |conn| Ok(service(conn)?.create(&owner, draft)?))
        .await?;
    Ok((StatusCode::CREATED, Json(goal.into())))
}

pub(super) async fn list(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
) -> Result<Json<Vec<GoalResponse>>, ApiError> {
    let goals = state
        .with_store(move |conn| Ok(service(conn)?.list(&owner)?))
        .await?;
    Ok(Json(goals.into_iter().map(GoalResponse::from).collect()))
}

pub(super) async fn update(
    State(state): State<SharedState>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<GoalRequest>, JsonRejection>,
) -> Result<Json<GoalResponse>, ApiError> {
    let id = path_id(&id, NOT_FOUND)?;
    let request = json_body(payload)?;
    let goal = state
        .with_store(move |conn| {
            let service = service(conn)?;
            let current = service.get(&owner, id)?;
            let draft = request.merge_into(&current)?;
            Ok(service.update(&owner, id, draft)?)
        })
        .await?;
    Ok(Json(goal.into()))
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
    Ok(Json(MessageResponse::new("Goal deleted")))
}
