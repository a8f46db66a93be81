// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;

pub const UNKNOWN_ROUTE: &str = "Unknow route";
pub const PAYLOAD_EXPECTED: &str = "A JSON payload was expected";

/// Typed API error: a user-facing reason plus the HTTP status it maps to.
///
/// Every variant except `Unhandled` is rendered verbatim as `{"error": reason}`.
/// `Unhandled` covers faults nobody anticipated; its detail is logged in full and
/// surfaced only behind the generic "Internal Server Error" prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    InvalidJson(String),
    SchemaViolation(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
    Unhandled(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::SchemaViolation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unhandled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get client-facing error message
    pub fn reason(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::InvalidJson(msg)
            | ApiError::SchemaViolation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::Unhandled(detail) => format!("Internal Server Error - {}", detail),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({ "error": self.reason() })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn invalid_json() -> Self {
        ApiError::InvalidJson(PAYLOAD_EXPECTED.to_string())
    }

    pub fn schema_violation(message: impl Into<String>) -> Self {
        ApiError::SchemaViolation(message.into())
    }

    pub fn unknown_route() -> Self {
        ApiError::BadRequest(UNKNOWN_ROUTE.to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn unhandled(detail: impl Into<String>) -> Self {
        ApiError::Unhandled(detail.into())
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Missing | TokenError::Expired | TokenError::Invalid => {
                ApiError::unauthorized(err.to_string())
            }
            TokenError::Signing(_) => ApiError::unhandled(err.to_string()),
        }
    }
}

impl From<bcrypt::BcryptError> for ApiError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ApiError::unhandled(format!("password hashing failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        ApiError::unhandled(format!("background task failed: {}", err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::unhandled(format!("{:#}", err))
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.reason())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::Unhandled(detail) = &self {
            tracing::error!("Unhandled error while processing request: {}", detail);
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
