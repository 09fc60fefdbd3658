//! v1 API handlers

pub mod chat;
pub mod traces;

use axum::routing::{get, post};
use axum::Router;

use super::state::AppState;

/// Create the v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat::create_chat_query))
        .route("/traces/{session_id}", get(traces::get_session_traces))
}
