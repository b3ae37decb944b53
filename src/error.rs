//! Service error types with HTTP status code mapping.
//!
//! [`ServiceError`] is the central error type of the pipeline and the read
//! API. Inside the scheduler every variant is recoverable; at the HTTP
//! boundary each variant maps to a status code and a structured JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::SubscriberId;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid request: name must not be blank",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Pipeline and API error enum.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status               |
/// |-----------|-----------------|---------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request           |
/// | 2000–2999 | State/Not Found | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server          | 500 Internal Server Error |
/// | 5000–5999 | Upstream        | 502 Bad Gateway           |
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The lobby listing could not be fetched or decoded. Transient.
    #[error("lobby fetch failed: {0}")]
    FetchError(String),

    /// A snapshot already exists at this capture timestamp.
    #[error("snapshot already recorded at timestamp {0}")]
    DuplicateTimestamp(i64),

    /// A notification could not be delivered.
    #[error("delivery to subscriber {subscriber_id} failed: {reason}")]
    DeliveryFailure {
        /// Intended recipient.
        subscriber_id: SubscriberId,
        /// Transport or channel error.
        reason: String,
    },

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::NotFound(_) => 2001,
            Self::DuplicateTimestamp(_) => 2002,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::FetchError(_) => 5001,
            Self::DeliveryFailure { .. } => 5002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::DuplicateTimestamp(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::FetchError(_) | Self::DeliveryFailure { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Wraps a database error.
    pub(crate) fn persistence(err: impl std::fmt::Display) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn codes_and_statuses() {
        let err = ServiceError::NotFound("no snapshot recorded".to_string());
        assert_eq!(err.error_code(), 2001);
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ServiceError::DuplicateTimestamp(10);
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.to_string(), "snapshot already recorded at timestamp 10");
    }

    #[test]
    fn delivery_failure_names_subscriber() {
        let err = ServiceError::DeliveryFailure {
            subscriber_id: SubscriberId::new(42),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("42"));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn into_response_sets_status() {
        let response = ServiceError::InvalidRequest("blank".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
