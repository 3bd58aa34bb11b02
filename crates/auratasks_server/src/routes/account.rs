use super::json_body;
use crate::auth::AuthUser;
use crate::dto::{AuthResponse, LoginRequest, RegisterRequest};
use crate::error::ApiError;
use crate::state::SharedState;
use auratasks_core::{AccountService, Registration, SqliteUserRepository, UserProfile};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

pub(super) async fn register(
    State(state): State<SharedState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let registration = Registration::from(json_body(payload)?);
    let tokens = state.tokens.clone();
    let session = state
        .with_store(move |conn| {
            let service = AccountService::new(SqliteUserRepository::try_new(conn)?, tokens);
            Ok(service.register(registration)?)
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully",
            token: session.token,
            user: session.user,
        }),
    ))
}

pub(super) async fn login(
    State(state): State<SharedState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let request = json_body(payload)?;
    let tokens = state.tokens.clone();
    let session = state
        .with_store(move |conn| {
            let service = AccountService::new(SqliteUserRepository::try_new(conn)?, tokens);
            let email = request.email.unwrap_or_default();
            Ok(service.login(&email, request.password.as_deref())?)
        })
        .await?;

    Ok(Json(AuthResponse {
        message: "Login successful",
        token: session.token,
        user: session.user,
    }))
}

pub(super) async fn profile(
    State(state): State<SharedState>,
    AuthUser(email): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let tokens = state.tokens.clone();
    let profile = state
        .with_store(move |conn| {
            let service = AccountService::new(SqliteUserRepository::try_new(conn)?, tokens);
            Ok(service.profile(&email)?)
        })
        .await?;
    Ok(Json(profile))
}
