//! Authentication error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Token verification and minting failures
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Malformed token")]
    MalformedToken,

    #[error("Bad token signature")]
    BadSignature,

    #[error("Token expired")]
    Expired,

    #[error("Token subject must not be empty")]
    EmptySubject,

    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Signing key configuration errors, fatal at start-up
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT secret is missing or empty")]
    EmptySecret,

    #[error("JWT secret is {len} bytes, at least {min} bytes are required")]
    SecretTooShort { len: usize, min: usize },

    #[error("Token expiry must be at least one second")]
    NonPositiveExpiry,
}

/// Identity lookup failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("Subject not found: {0}")]
    NotFound(String),

    #[error("Identity lookup unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Identity lookup unavailable: {0}")]
    LookupUnavailable(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AuthError::Unauthenticated => (StatusCode::UNAUTHORIZED, "Not authenticated"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthError::LookupUnavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Authentication temporarily unavailable",
            ),
            AuthError::PasswordHash(_) | AuthError::Token(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
