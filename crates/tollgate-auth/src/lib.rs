//! Tollgate Authentication
//!
//! This crate provides HS256 bearer-token issuance and verification,
//! the per-request authenticator, and the Axum layers that place them
//! in front of handlers.

pub mod authenticator;
pub mod error;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod policy;

pub use authenticator::{
    AuthContext, AuthOutcome, Authenticator, Decision, extract_bearer_token,
};
pub use error::{AuthError, ConfigError, LookupError, TokenError};
pub use identity::{Identity, IdentityLookup};
pub use jwt::{Claims, MIN_SECRET_LEN, TokenCodec};
pub use middleware::{auth_middleware, require_identity};
pub use password::{
    Argon2Verifier, PasswordVerifier, hash_password, validate_hash, verify_password,
};
pub use policy::{AccessPolicy, DEFAULT_PUBLIC_PATHS};
