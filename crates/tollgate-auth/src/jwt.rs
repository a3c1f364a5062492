//! JWT token management

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ConfigError, TokenError};

/// Minimum secret length in bytes for HMAC-SHA-256 signing (256 bits)
pub const MIN_SECRET_LEN: usize = 32;

/// Verified token claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token identifier
    pub jti: String,
}

/// Mints and verifies HS256-signed bearer tokens.
///
/// Built once from the configured secret and shared read-only between
/// the login handler and the request authenticator. Every operation takes
/// `now` from the caller; the codec never reads the wall clock.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}

impl TokenCodec {
    /// Create a codec from a secret and a token lifetime.
    ///
    /// The secret must be at least [`MIN_SECRET_LEN`] bytes. The lifetime is
    /// truncated to whole seconds and must be at least one second.
    pub fn new(secret: &[u8], expiry: Duration) -> Result<Self, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::SecretTooShort {
                len: secret.len(),
                min: MIN_SECRET_LEN,
            });
        }

        let expiry = Duration::seconds(expiry.num_seconds());
        if expiry <= Duration::zero() {
            return Err(ConfigError::NonPositiveExpiry);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify` against the caller's `now`
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            expiry,
        })
    }

    /// Configured token lifetime
    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Mint a token for `subject`, issued at `now`
    pub fn mint(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::EmptySubject);
        }

        let iat = now.timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat,
            exp: iat + self.expiry.num_seconds(),
            jti: Uuid::new_v4().to_string(),
        };

        debug!("Minting token for subject: {}", subject);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Verify a token's signature and expiry at `now` and return its claims.
    ///
    /// The signature is checked first; an expired token with a forged
    /// signature reports `BadSignature`. Expiry is exclusive: a token is
    /// rejected from its `exp` second onwards.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::MalformedToken,
            })?;

        if now.timestamp() >= token_data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(token_data.claims)
    }
}
