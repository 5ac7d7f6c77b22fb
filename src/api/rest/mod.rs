//! REST API module for HTTP endpoints
//!
//! - `GET /xAPI/statements?statementId=..` - Single statement
//! - `GET /xAPI/statements?actor=..&activity=..` - Filtered, paged statements
//! - `POST /xAPI/statements` - Store one statement or an array of statements

pub mod statements;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::service::ServiceError;
use crate::types::EncodingError;

/// Content type of every JSON response
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Build a response from an already encoded JSON body
pub fn json_body(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_UTF8))],
        body,
    )
        .into_response()
}

/// Respond with canonical JSON, or an encoding error if it could not be produced
pub fn encoded(status: StatusCode, json: Result<String, EncodingError>) -> Response {
    match json {
        Ok(body) => json_body(status, body),
        Err(e) => ApiError::from(ServiceError::from(e)).into_response(),
    }
}

/// API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    pub code: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            error: message.into(),
            code: code.to_string(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn internal(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, code, message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::Validation(_) => Self::bad_request(message),
            ServiceError::NotFound(_) => Self::not_found(message),
            ServiceError::Conflict(_) => Self::new(StatusCode::CONFLICT, "CONFLICT", message),
            ServiceError::Malformed { .. } => Self::internal("MALFORMED_RECORD", message),
            ServiceError::StoreUnavailable(_) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE", message)
            }
            ServiceError::StoreWriteFailure(_) => Self::internal("STORE_WRITE_FAILED", message),
            ServiceError::Encoding(_) => Self::internal("ENCODING_ERROR", message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => Self::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_MEDIA_TYPE",
                rejection.body_text(),
            ),
            _ => Self::bad_request(rejection.body_text()),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(code = %self.code, error = %self.error, "request failed");
        }
        match serde_json::to_string(&self) {
            Ok(body) => json_body(self.status, body),
            Err(_) => self.status.into_response(),
        }
    }
}
