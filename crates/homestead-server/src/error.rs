//! Error types for the game API.
//!
//! [`ApiError`] wraps engine errors and request-shape failures and renders
//! every one of them as the same JSON body:
//!
//! ```json
//! { "code": 2004, "name": "CROP_NOT_MATURED", "kind": "PreconditionFailed", "message": "..." }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use homestead_interactions::{ErrorKind, GameError};

/// Code reported for malformed requests.
const INVALID_REQUEST_CODE: u32 = 1000;

/// Code reported when the caller's identity is missing.
const UNAUTHENTICATED_CODE: u32 = 1002;

/// Errors that can occur in the API layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A game rule or store failure raised by an engine.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The request body, path, or query failed to parse or validate.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The identity header is missing or malformed.
    #[error("missing or malformed x-user-id header")]
    Unauthenticated,
}

/// HTTP status for an error category.
pub const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation
        | ErrorKind::PreconditionFailed
        | ErrorKind::InsufficientResources => StatusCode::BAD_REQUEST,
        ErrorKind::QuotaExceeded | ErrorKind::AuthorizationFailed => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, name, kind, message) = match &self {
            Self::Game(err) => {
                let kind = err.kind();
                let message = if kind == ErrorKind::Internal {
                    tracing::error!(error = %err, code = err.code(), "Request failed");
                    "internal server error".to_owned()
                } else {
                    err.to_string()
                };
                (status_for(kind), err.code(), err.code_name(), kind, message)
            }
            Self::InvalidRequest(msg) => (
                StatusCode::BAD_REQUEST,
                INVALID_REQUEST_CODE,
                "VALIDATION_ERROR",
                ErrorKind::Validation,
                msg.clone(),
            ),
            Self::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                UNAUTHENTICATED_CODE,
                "UNAUTHENTICATED",
                ErrorKind::AuthorizationFailed,
                self.to_string(),
            ),
        };

        let body = serde_json::json!({
            "code": code,
            "name": name,
            "kind": kind,
            "message": message,
        });

        (status, axum::Json(body)).into_response()
    }
}
