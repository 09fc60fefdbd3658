//! Chat query endpoint handler

use axum::{extract::State, response::IntoResponse, response::Response};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ChatQueryRequest, ChatQueryResponse, Json};
use crate::domain::pipeline::QueryOptions;

/// POST /v1/chat
pub async fn create_chat_query(
    State(state): State<AppState>,
    Json(request): Json<ChatQueryRequest>,
) -> Result<Response, ApiError> {
    request.validate().map_err(|e| {
        ApiError::bad_request(format!("Invalid request: {}", e)).with_param("message")
    })?;

    let session_id = request
        .session_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    info!(
        session_id = %session_id,
        query_chars = request.message.chars().count(),
        enable_guardrails = request.enable_guardrails,
        "Processing chat query"
    );

    let options = QueryOptions::new()
        .with_enable_guardrails(request.enable_guardrails)
        .with_return_traces(request.return_traces);

    let outcome = state
        .orchestrator
        .handle_query(&session_id, &request.message, options)
        .await
        .map_err(ApiError::from)?;

    let response = ChatQueryResponse::from_outcome(outcome, &session_id, &request.message);

    Ok(Json(response).into_response())
}
