//! Health check endpoints

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health status response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Whether any user can log in
    pub users_loaded: bool,
    pub token_expiry_secs: i64,
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    metrics::counter!("tollgate_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        users_loaded: state.users.has_users(),
        token_expiry_secs: state.codec.expiry().num_seconds(),
    })
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
