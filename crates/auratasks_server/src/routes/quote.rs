use crate::error::ApiError;
use crate::state::SharedState;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

pub(super) async fn quote(State(state): State<SharedState>) -> Result<Json<Value>, ApiError> {
    state
        .quotes
        .fetch()
        .await
        .map(Json)
        .map_err(|_| ApiError::BadGateway("Failed to fetch quote"))
}
