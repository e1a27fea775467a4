//! services/api/src/web/respond.rs
//!
//! The single JSON error envelope every handler fails with: `{"error": "..."}`
//! plus the HTTP status from the error taxonomy (400 bad input, 401 no
//! session, 403 denied, 404 not found, 500 unexpected).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use storefront_core::ports::PortError;
use tracing::error;

/// A failed request: a status code and the message placed in the envelope.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Not authenticated")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<PortError> for ApiFailure {
    fn from(err: PortError) -> Self {
        match err {
            PortError::NotFound(message) => Self::not_found(message),
            PortError::Forbidden(message) => Self::forbidden(message),
            PortError::Unexpected(message) => {
                error!("Unexpected store error: {}", message);
                Self::internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_errors_map_to_their_status_codes() {
        let f = ApiFailure::from(PortError::NotFound("Cart not found".into()));
        assert_eq!(f.status, StatusCode::NOT_FOUND);
        assert_eq!(f.message, "Cart not found");

        let f = ApiFailure::from(PortError::Forbidden("nope".into()));
        assert_eq!(f.status, StatusCode::FORBIDDEN);

        let f = ApiFailure::from(PortError::Unexpected("boom".into()));
        assert_eq!(f.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_uses_the_canonical_message() {
        let f = ApiFailure::unauthorized();
        assert_eq!(f.status, StatusCode::UNAUTHORIZED);
        assert_eq!(f.message, "Not authenticated");
    }
}
