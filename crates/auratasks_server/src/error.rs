//! HTTP error mapping.
//!
//! # Responsibility
//! - Translate core service failures into status codes and `{"error": ...}` bodies.
//! - Describe startup failures of the server process.
//!
//! # Invariants
//! - 5xx responses never echo internal error text to clients.

use auratasks_core::db::DbError;
use auratasks_core::{
    AccountServiceError, GoalServiceError, RepoError, TaskServiceError, TokenError,
};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::{error, warn};
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    Unauthorized(&'static str),
    NotFound(&'static str),
    /// Store busy or unreachable; the client may retry.
    Unavailable,
    BadGateway(&'static str),
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::Unauthorized(message) | Self::NotFound(message) | Self::BadGateway(message) => {
                write!(f, "{message}")
            }
            Self::Unavailable => write!(f, "Service temporarily unavailable"),
            Self::Internal => write!(f, "Internal server error"),
        }
    }
}

impl Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!(
                "event=http_error module=server status=error code={}",
                status.as_u16()
            );
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(value: DbError) -> Self {
        if value.is_busy() {
            warn!("event=db_open module=server status=error reason=busy error={value}");
        } else {
            error!("event=db_open module=server status=error error={value}");
        }
        match value {
            DbError::UnsupportedSchemaVersion { .. } => Self::Internal,
            _ => Self::Unavailable,
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        error!("event=repo_init module=server status=error error={value}");
        if value.is_store_fault() {
            Self::Unavailable
        } else {
            Self::Internal
        }
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(value: TaskServiceError) -> Self {
        match value {
            TaskServiceError::InvalidTask(err) => Self::bad_request(err.to_string()),
            TaskServiceError::NotFound(_) => Self::NotFound("Task not found"),
            TaskServiceError::InvalidBatch(rejection) => Self::bad_request(rejection.to_string()),
            TaskServiceError::StoreUnavailable(_) => Self::Unavailable,
        }
    }
}

impl From<GoalServiceError> for ApiError {
    fn from(value: GoalServiceError) -> Self {
        match value {
            GoalServiceError::InvalidGoal(err) => Self::bad_request(err.to_string()),
            GoalServiceError::NotFound(_) => Self::NotFound("Goal not found"),
            GoalServiceError::StoreUnavailable(_) => Self::Unavailable,
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(value: AccountServiceError) -> Self {
        match value {
            AccountServiceError::Invalid(err) => Self::bad_request(err.to_string()),
            AccountServiceError::EmailTaken => {
                Self::bad_request("User with this email already exists")
            }
            AccountServiceError::InvalidCredentials => Self::bad_request("Invalid credentials"),
            AccountServiceError::UserNotFound => Self::NotFound("User not found"),
            AccountServiceError::StoreUnavailable(_) => Self::Unavailable,
            AccountServiceError::Password(err) => {
                error!("event=account_crypto module=server status=error error={err}");
                Self::Internal
            }
            AccountServiceError::Token(err) => {
                error!("event=account_crypto module=server status=error error={err}");
                Self::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        Self::Unauthorized("Invalid token")
    }
}

/// Failure to bring the server up or keep it running.
#[derive(Debug)]
pub enum ServerError {
    Store(DbError),
    HttpClient(reqwest::Error),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "store bootstrap failed: {err}"),
            Self::HttpClient(err) => write!(f, "http client setup failed: {err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::HttpClient(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Store(value)
    }
}

impl From<reqwest::Error> for ServerError {
    fn from(value: reqwest::Error) -> Self {
        Self::HttpClient(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
