//! Route table and shared handler helpers.

mod account;
mod goals;
mod quote;
mod tasks;

use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::rejection::JsonRejection;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Method;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use std::time::Duration;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

const HEALTH_TEXT: &str = "SIMPLE CRUD IS RUNNING";

/// Builds the full API router over `state`.
pub fn router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.cors_origin.clone())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/", get(health))
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .route("/profile", get(account::profile))
        .route("/quote", get(quote::quote))
        .route("/tasks", post(tasks::create).get(tasks::list))
        .route("/tasks/reorder", post(tasks::reorder))
        .route("/tasks/{id}", put(tasks::update).delete(tasks::delete))
        .route("/goals", post(goals::create).get(goals::list))
        .route("/goals/{id}", put(goals::update).delete(goals::delete))
        .layer(cors)
        .with_state(state)
}

async fn health() -> &'static str {
    HEALTH_TEXT
}

/// Unwraps a JSON body, turning malformed input into a 400.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

/// Ids that are not UUIDs cannot name a stored record.
fn path_id(raw: &str, not_found: &'static str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound(not_found))
}
