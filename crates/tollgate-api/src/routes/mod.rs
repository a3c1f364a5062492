//! API routes

mod auth;
mod health;
pub mod metrics;

use axum::{Router, middleware::from_fn_with_state};
use std::sync::Arc;
use tollgate_auth::{auth_middleware, require_identity};

use crate::state::{AppState, MetricsHandle};

pub use auth::{CurrentIdentity, LoginRequest, LoginResponse};

/// Create the main router
///
/// Every route, public ones included, passes through `auth_middleware`
/// first and `require_identity` second.
pub fn create_router(state: AppState, metrics_handle: Option<Arc<MetricsHandle>>) -> Router {
    let mut router = Router::new()
        // Health check
        .merge(health::routes())
        // Login and current identity
        .merge(auth::routes())
        .with_state(state.clone());

    // Add metrics endpoint if handle is provided
    if let Some(handle) = metrics_handle {
        router = router.merge(metrics::routes(handle));
    }

    router
        .layer(from_fn_with_state(state.policy.clone(), require_identity))
        .layer(from_fn_with_state(state.authenticator.clone(), auth_middleware))
}
