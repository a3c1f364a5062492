//! Application state

use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tollgate_auth::{AccessPolicy, Authenticator, PasswordVerifier, TokenCodec};
use tollgate_store::UserStore;

/// Handle used to render the Prometheus exposition
pub type MetricsHandle = PrometheusHandle;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub codec: Arc<TokenCodec>,
    pub authenticator: Arc<Authenticator>,
    pub policy: Arc<AccessPolicy>,
    pub passwords: Arc<dyn PasswordVerifier>,
}

impl AppState {
    pub fn new(
        users: UserStore,
        codec: Arc<TokenCodec>,
        passwords: Arc<dyn PasswordVerifier>,
        policy: AccessPolicy,
        lookup_timeout: Duration,
    ) -> Self {
        let authenticator = Arc::new(Authenticator::new(
            codec.clone(),
            Arc::new(users.clone()),
            lookup_timeout,
        ));

        Self {
            users,
            codec,
            authenticator,
            policy: Arc::new(policy),
            passwords,
        }
    }
}
