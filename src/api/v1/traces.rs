//! Session trace endpoint handler

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    response::Response,
};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, SessionTracesResponse};

/// GET /v1/traces/{session_id}
pub async fn get_session_traces(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let traces = state
        .trace_store
        .traces_for_session(&session_id)
        .await
        .map_err(ApiError::from)?;

    let turns = state
        .trace_store
        .turns_for_session(&session_id)
        .await
        .map_err(ApiError::from)?;

    if traces.is_empty() && turns.is_empty() {
        return Err(ApiError::not_found(format!(
            "No traces recorded for session '{}'",
            session_id
        )));
    }

    Ok(Json(SessionTracesResponse {
        session_id,
        traces,
        turns,
    })
    .into_response())
}
