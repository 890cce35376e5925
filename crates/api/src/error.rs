//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// The request body failed order validation.
    Validation(OrderError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound(msg) => error_response(StatusCode::NOT_FOUND, &msg),
            ApiError::BadRequest(msg) => error_response(StatusCode::BAD_REQUEST, &msg),
            ApiError::Validation(err) => {
                // Identify the offending field so callers can point at it.
                let body = serde_json::json!({
                    "error": err.to_string(),
                    "field": err.field(),
                });
                (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, &msg)
            }
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "error": message });
    (status, axum::Json(body)).into_response()
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("Order {id} not found")),
            StoreError::Validation(err) => ApiError::Validation(err),
            StoreError::Database(_) | StoreError::Migration(_) => {
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        ApiError::Validation(err)
    }
}
