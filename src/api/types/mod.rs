//! API request/response types

pub mod chat;
pub mod error;
pub mod json;

pub use chat::{ChatQueryRequest, ChatQueryResponse, SessionTracesResponse};
pub use error::{ApiError, ApiErrorDetail, ApiErrorResponse, ApiErrorType};
pub use json::Json;
