//! Error types for catalog-server
//!
//! Store and validation failures are unified here and mapped to HTTP
//! responses at the gateway boundary.

use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use catalog_common::ValidationError;
use serde_json::json;
use thiserror::Error;

/// Gateway error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Referenced id does not exist (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Caller-supplied fields failed validation (400)
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Request body or path could not be decoded (400)
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Write could not be completed durably (500)
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Backing document missing or malformed (503)
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ApiError::NotFound(format!("record {}", id)),
            StoreError::PersistenceFailure(msg) => ApiError::Persistence(msg),
            StoreError::StorageUnavailable(msg) => ApiError::StorageUnavailable(msg),
        }
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Validation(_) | ApiError::BadRequest(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_FAILURE")
            }
            ApiError::Persistence(_) => (StatusCode::INTERNAL_SERVER_ERROR, "PERSISTENCE_FAILURE"),
            ApiError::StorageUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(json!({
            "status": "error",
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for gateway operations
pub type ApiResult<T> = Result<T, ApiError>;
