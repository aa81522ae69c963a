//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use monnify_core::MonnifyError;
use serde::Serialize;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - malformed webhook body or missing mandatory field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The delivery's signature did not verify and the service rejects such deliveries.
    #[error("invalid webhook signature")]
    InvalidSignature {
        /// Delivery ID assigned to the rejected notification.
        delivery_id: uuid::Uuid,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match &self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::InvalidSignature { delivery_id } => (
                StatusCode::UNAUTHORIZED,
                "invalid_signature",
                self.to_string(),
                Some(serde_json::json!({ "delivery_id": delivery_id })),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<MonnifyError> for ApiError {
    fn from(err: MonnifyError) -> Self {
        if err.is_malformed_input() {
            Self::BadRequest(err.to_string())
        } else {
            Self::Internal(err.to_string())
        }
    }
}
