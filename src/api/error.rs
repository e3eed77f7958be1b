//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.
//!
//! Client errors answer `{"message": ...}`, server errors answer
//! `{"message": ..., "error": ...}`. Every error carries a generated
//! `x-request-id` header that matches the logged entry.

use crate::report::ReportError;
use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Message returned to clients when a report could not be produced
pub const REPORT_FAILURE_MESSAGE: &str = "An error occurred while generating the PDF";

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("{0}")]
    Validation(String),

    /// Report generation error
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Report(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Report(_) | ApiError::Internal(_) | ApiError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn body(&self) -> ErrorResponse {
        match self {
            ApiError::Validation(message) => ErrorResponse {
                message: message.clone(),
                error: None,
            },
            ApiError::Report(e) if e.is_client_error() => ErrorResponse {
                message: e.to_string(),
                error: None,
            },
            ApiError::Report(e) => ErrorResponse {
                message: REPORT_FAILURE_MESSAGE.to_string(),
                error: Some(e.to_string()),
            },
            ApiError::Internal(_) | ApiError::Io(_) => ErrorResponse {
                message: "Internal server error".to_string(),
                error: Some(self.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                status = status.as_u16(),
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::warn!(
                request_id = %request_id,
                status = status.as_u16(),
                error_message = %self,
                "Rejected request"
            );
        }

        let mut response = (status, Json(self.body())).into_response();
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }
        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{EntityKind, StoreError};

    #[test]
    fn test_client_errors_have_no_detail() {
        let err = ApiError::from(ReportError::invalid("month", "bad month"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let body = serde_json::to_value(err.body()).unwrap();
        assert_eq!(body, serde_json::json!({ "message": "bad month" }));
    }

    #[test]
    fn test_server_errors_carry_detail() {
        let err = ApiError::from(ReportError::AggregationFailure {
            kind: EntityKind::Appointment,
            source: StoreError::Task("worker gone".to_string()),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = err.body();
        assert_eq!(body.message, REPORT_FAILURE_MESSAGE);
        assert!(body.error.unwrap().contains("worker gone"));
    }

    #[test]
    fn test_response_has_request_id() {
        let response = ApiError::Internal("boom".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.headers().contains_key("x-request-id"));
    }
}
