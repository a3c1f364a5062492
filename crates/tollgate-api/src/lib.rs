//! Tollgate REST API
//!
//! This crate provides the Axum-based HTTP surface: password login that
//! mints bearer tokens, the current-identity endpoint, health checks and
//! Prometheus metrics, all behind the authentication layers.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::{AppState, MetricsHandle};
