//! Broker error types with HTTP status code mapping.
//!
//! [`BrokerError`] covers the boundary failures of the broker. Per-subscriber
//! delivery failures are handled inside the hub and never show up here.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid room: room id must not be empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code.
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Broker error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category   | HTTP Status                 |
/// |-----------|------------|-----------------------------|
/// | 1000–1999 | Validation | 400 Bad Request             |
/// | 3000–3999 | Server     | 500 / 503                   |
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Room identifier failed validation.
    #[error("invalid room: {0}")]
    InvalidRoom(String),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The hub control loop is no longer accepting requests.
    #[error("hub is not running")]
    HubUnavailable,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BrokerError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRoom(_) => 1001,
            Self::Internal(_) => 3000,
            Self::HubUnavailable => 3001,
            Self::InvalidConfig(_) => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRoom(_) => StatusCode::BAD_REQUEST,
            Self::HubUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidConfig(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
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
mod tests {
    use super::*;

    #[test]
    fn invalid_room_maps_to_bad_request() {
        let err = BrokerError::InvalidRoom("empty".to_string());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_code(), 1001);
        assert_eq!(err.to_string(), "invalid room: empty");
    }

    #[test]
    fn hub_unavailable_maps_to_service_unavailable() {
        let response = BrokerError::HubUnavailable.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
