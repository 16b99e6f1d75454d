//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use qron_core::{Denial, Tier};

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Unauthorized - missing or invalid credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Forbidden - valid credentials but insufficient entitlement.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Generation limit reached.
    #[error("generation limit reached ({used}/{limit})")]
    LimitReached {
        /// Generations consumed this period.
        used: u32,
        /// The period allowance.
        limit: u32,
    },

    /// A tier upgrade is required for the requested mode or preset.
    #[error("upgrade to {required} required")]
    UpgradeRequired {
        /// The minimum sufficient tier.
        required: Tier,
    },

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),

    /// External service error (QR render, style transfer, email, gateway).
    #[error("external service error: {0}")]
    Upstream(String),
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
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
                None,
            ),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone(), None),
            Self::LimitReached { used, limit } => (
                StatusCode::FORBIDDEN,
                "limit_reached",
                self.to_string(),
                Some(serde_json::json!({
                    "used": used,
                    "limit": limit
                })),
            ),
            Self::UpgradeRequired { required } => (
                StatusCode::FORBIDDEN,
                "upgrade_required",
                self.to_string(),
                Some(serde_json::json!({ "required_tier": required })),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone(), None),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone(), None),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            Self::Upstream(msg) => {
                // Upstream bodies are logged but never forwarded to clients.
                tracing::error!(error = %msg, "Upstream service error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "upstream_error",
                    "An upstream service failed".to_string(),
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

impl From<qron_store::StoreError> for ApiError {
    fn from(err: qron_store::StoreError) -> Self {
        match err {
            qron_store::StoreError::NotFound => Self::NotFound("record not found".into()),
            qron_store::StoreError::Database(msg) | qron_store::StoreError::Serialization(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

impl From<Denial> for ApiError {
    fn from(denial: Denial) -> Self {
        match denial {
            Denial::UnknownMode(_) | Denial::UnknownPreset(_) => {
                Self::BadRequest(denial.to_string())
            }
            Denial::LimitReached { used, limit } => Self::LimitReached { used, limit },
            Denial::TierRequired { required } => Self::UpgradeRequired { required },
        }
    }
}
