//! API Error types

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tanod_core::TrackingError;
use thiserror::Error;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown officer: {0}")]
    UnknownOfficer(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Store unreachable; the caller should retry with backoff
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<TrackingError> for ApiError {
    fn from(e: TrackingError) -> Self {
        match e {
            TrackingError::Validation(msg) => ApiError::Validation(msg),
            TrackingError::UnknownOfficer(id) => ApiError::UnknownOfficer(id),
            TrackingError::NotFound(what) => ApiError::NotFound(what),
            TrackingError::Store(msg) | TrackingError::Resolution(msg) => ApiError::Unavailable(msg),
            TrackingError::Serialization(e) => ApiError::Internal(e.to_string()),
        }
    }
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::UnknownOfficer(_) => (StatusCode::NOT_FOUND, "UNKNOWN_OFFICER"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// Body rejections keep the JSON error envelope.
///
/// Well-formed JSON of the wrong shape is a validation failure; anything
/// else (syntax, content type, unreadable body) is a bad request.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonDataError(e) => ApiError::Validation(e.body_text()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "Request failed");
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// API result type
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracking_error_mapping() {
        let cases = [
            (TrackingError::Validation("bad".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (TrackingError::UnknownOfficer("x".into()), StatusCode::NOT_FOUND),
            (TrackingError::NotFound("s".into()), StatusCode::NOT_FOUND),
            (TrackingError::Store("down".into()), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status_and_code().0, status);
        }
    }
}
