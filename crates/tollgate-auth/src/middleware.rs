//! Authentication middleware for Axum
//!
//! Two layers, composed explicitly on the router:
//! `auth_middleware` runs the [`Authenticator`] and stores the request's
//! [`AuthContext`]; `require_identity` consults the [`AccessPolicy`] and
//! rejects protected requests that carry no identity.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

use crate::authenticator::{AuthContext, Authenticator, Decision};
use crate::error::AuthError;
use crate::policy::AccessPolicy;

/// Authentication middleware
///
/// Extracts and verifies the bearer token and attaches the resolved
/// identity to the request's `AuthContext` extension. Invalid or missing
/// credentials do not stop the request here.
pub async fn auth_middleware(
    State(authenticator): State<Arc<Authenticator>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let mut ctx = request
        .extensions_mut()
        .remove::<AuthContext>()
        .unwrap_or_default();

    match authenticator
        .intercept(request.headers(), &mut ctx, Utc::now())
        .await
    {
        Decision::Continue(outcome) => {
            debug!(
                "{} {} -> {}",
                request.method(),
                request.uri().path(),
                outcome.as_str()
            );
            request.extensions_mut().insert(ctx);
            Ok(next.run(request).await)
        }
        Decision::Reject(e) => Err(e),
    }
}

/// Middleware to require an attached identity outside public paths
pub async fn require_identity(
    State(policy): State<Arc<AccessPolicy>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if policy.is_public(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let authenticated = request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(AuthContext::is_authenticated);

    if !authenticated {
        debug!("Rejecting unauthenticated request to {}", request.uri().path());
        return Err(AuthError::Unauthenticated);
    }

    Ok(next.run(request).await)
}
