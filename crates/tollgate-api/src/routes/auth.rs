//! Authentication extractors and routes

use axum::{
    Json, Router,
    extract::{FromRequestParts, State},
    http::request::Parts,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tollgate_auth::{AuthContext, AuthError, Identity};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;

// ==================== Auth Extractors ====================

/// Extractor for the identity attached by the authentication layer
pub struct CurrentIdentity(pub Identity);

impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::identity)
            .cloned()
            .map(CurrentIdentity)
            .ok_or(ApiError::Unauthorized)
    }
}

// ==================== Request/Response Types ====================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Token lifetime in seconds
    pub expires_in: i64,
}

// ==================== Input Validation ====================

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;
/// Maximum allowed password length (prevent DoS with very large passwords)
const MAX_PASSWORD_LENGTH: usize = 256;

/// Valid Argon2 hash that never matches; verified against when the user
/// does not exist so both failure paths cost the same
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGltaW5nX2F0dGFja19wcmV2ZW50aW9u$K8rI5T7VdQ8xkO0GqK5K2w";

fn validate_login(request: &LoginRequest) -> Result<(), ApiError> {
    if request.username.is_empty() {
        return Err(ApiError::BadRequest("Username cannot be empty".to_string()));
    }
    if request.username.len() > MAX_USERNAME_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if request.password.len() > MAX_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password exceeds maximum length of {} characters",
            MAX_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

// ==================== Auth Routes ====================

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    validate_login(&request)?;

    debug!("Login attempt for user: {}", request.username);

    let user = state.users.get_user_by_username(&request.username);
    let hash_to_verify = user
        .as_ref()
        .map_or(DUMMY_HASH, |u| u.password_hash.as_str());

    let password_valid = state.passwords.verify(&request.password, hash_to_verify)?;

    let user = match (user, password_valid) {
        (Some(u), true) => u,
        _ => {
            metrics::counter!("tollgate_logins_total", "result" => "rejected").increment(1);
            return Err(AuthError::InvalidCredentials.into());
        }
    };

    let token = state.codec.mint(&user.username, Utc::now())?;

    metrics::counter!("tollgate_logins_total", "result" => "accepted").increment(1);
    info!("User {} logged in successfully", user.username);

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.codec.expiry().num_seconds(),
    }))
}

/// GET /api/auth/me
async fn me(CurrentIdentity(identity): CurrentIdentity) -> Json<Identity> {
    Json(identity)
}

/// Create auth routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
