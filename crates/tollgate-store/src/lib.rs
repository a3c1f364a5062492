//! Tollgate User Store
//!
//! In-memory user directory seeded at start-up. It backs password login
//! and implements the identity lookup used by the request authenticator.

pub mod error;
pub mod models;
pub mod repository;

pub use error::StoreError;
pub use models::*;
pub use repository::UserStore;
