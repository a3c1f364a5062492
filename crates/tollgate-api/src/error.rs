//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Auth error: {0}")]
    Auth(#[from] tollgate_auth::AuthError),
}

impl From<tollgate_auth::TokenError> for ApiError {
    fn from(e: tollgate_auth::TokenError) -> Self {
        ApiError::Auth(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Not authenticated".to_string()),
            ApiError::Auth(e) => {
                if let tollgate_auth::AuthError::PasswordHash(_) | tollgate_auth::AuthError::Token(_) = &e {
                    tracing::error!("Internal auth error: {}", e);
                }
                // Same status and body as the authentication layers
                return e.into_response();
            }
        };

        let body = axum::Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
