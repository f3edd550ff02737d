//! Error types for the directory API.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use callerid_directory::DirectoryError;
use serde::Serialize;
use thiserror::Error;

/// API error types.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Authentication credentials were not provided")]
    MissingToken,

    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        DirectoryError::validation(rejection.body_text()).into()
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        DirectoryError::validation(rejection.body_text()).into()
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Directory(e) => match e {
                DirectoryError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
                DirectoryError::DuplicatePhoneNumber(_) => {
                    (StatusCode::BAD_REQUEST, "DUPLICATE_PHONE_NUMBER")
                }
                DirectoryError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
                DirectoryError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
                DirectoryError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
                DirectoryError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR"),
                DirectoryError::PasswordHash(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::MissingToken => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::RateLimitExceeded => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
