//! Error types for the authentication core

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::types::RoleSet;

pub type Result<T> = std::result::Result<T, Error>;

/// Classified reason a token was rejected.
///
/// Internal only: the session resolver collapses every variant into
/// [`Error::Unauthenticated`] before anything crosses the public boundary,
/// so callers cannot probe why a token failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,

    #[error("signature rejected")]
    Tampered,

    #[error("malformed claims")]
    Malformed,
}

#[derive(Debug, Error)]
pub enum Error {
    /// No token was presented on the request.
    #[error("missing credential")]
    MissingCredential,

    /// A token was presented but failed decoding. Internal classification
    /// only; see [`TokenError`].
    #[error("invalid token: {0}")]
    InvalidToken(TokenError),

    /// Uniform rejection for anything short of a resolved principal:
    /// missing, tampered, expired, or orphaned tokens all land here.
    #[error("authentication required")]
    Unauthenticated,

    /// Login failure. Unknown identity and wrong password are deliberately
    /// indistinguishable.
    #[error("invalid credentials")]
    AuthenticationFailed,

    /// Valid session, insufficient role.
    #[error("role not permitted, one of {required} required")]
    Forbidden { required: RoleSet },

    #[error("principal already registered: {0}")]
    PrincipalExists(String),

    /// Integrity conflict surfaced by the store layer.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("password hashing error: {0}")]
    PasswordHash(String),

    #[error("token encoding error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl From<TokenError> for Error {
    fn from(reason: TokenError) -> Self {
        Error::InvalidToken(reason)
    }
}

impl Error {
    /// Status code and caller-visible message. Internal token
    /// classification never leaks through here.
    fn status_and_message(&self) -> (StatusCode, &'static str) {
        match self {
            Error::MissingCredential
            | Error::InvalidToken(_)
            | Error::Unauthenticated => (StatusCode::UNAUTHORIZED, "authentication required"),
            Error::AuthenticationFailed => (StatusCode::UNAUTHORIZED, "invalid credentials"),
            Error::Forbidden { .. } => (StatusCode::FORBIDDEN, "insufficient role"),
            Error::PrincipalExists(_) | Error::Conflict(_) => {
                (StatusCode::CONFLICT, "conflict")
            }
            Error::Database(_)
            | Error::PasswordHash(_)
            | Error::Jwt(_)
            | Error::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal error"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "request rejected");
        }

        let mut response =
            (status, Json(serde_json::json!({ "error": message }))).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}
