//! Error taxonomy shared by all request handlers.
//!
//! # Design Decisions
//! - No route / absent resource is never fatal (404)
//! - Auth failures short-circuit before handler bodies run (401)
//! - Lock conflicts are surfaced as WebSocket denial events, not HTTP errors;
//!   the `Conflict` variant exists for completeness of the taxonomy
//! - Collaborator failures degrade (502) instead of propagating raw

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Error type returned by route handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No route matched or the requested resource does not exist.
    #[error("not found")]
    NotFound,

    /// Missing/invalid session or API key.
    #[error("unauthorized")]
    Unauthorized,

    /// The request was understood but malformed (bad body, empty field).
    #[error("{0}")]
    BadRequest(String),

    /// Advisory lock held by another editor.
    #[error("locked by another editor")]
    Conflict,

    /// A collaborator (CMS fetch, translation store) failed.
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// Unrecoverable internal condition.
    #[error("internal error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict => StatusCode::CONFLICT,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::Conflict.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Upstream("cms".into()).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
