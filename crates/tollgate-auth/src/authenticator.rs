//! Request authenticator
//!
//! Turns an `Authorization` header into an [`AuthOutcome`], attaching the
//! resolved [`Identity`] to the request's [`AuthContext`]. Verification
//! failures are outcomes, not errors; only a failing identity backend is
//! reported as an [`AuthError`].

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{AuthError, LookupError, TokenError};
use crate::identity::{Identity, IdentityLookup};
use crate::jwt::TokenCodec;

pub const BEARER_PREFIX: &str = "Bearer ";

/// Extract the token from a `Bearer <token>` header value.
///
/// The prefix is case-sensitive. Anything else yields `None`.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    header?.strip_prefix(BEARER_PREFIX)
}

/// Per-request authentication state, stored in request extensions
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    identity: Option<Identity>,
}

impl AuthContext {
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Attach an identity unless one is already attached.
    ///
    /// Returns `false` and leaves the context untouched if it already
    /// holds an identity.
    pub fn attach(&mut self, identity: Identity) -> bool {
        if self.identity.is_some() {
            return false;
        }
        self.identity = Some(identity);
        true
    }
}

/// Result of authenticating one request
#[derive(Debug)]
pub enum AuthOutcome {
    /// No bearer credential was presented
    Unauthenticated,
    /// A token was presented but failed verification
    InvalidCredential(TokenError),
    /// The token verified but its subject is unknown
    UnknownSubject,
    /// The identity is attached to the context
    Authenticated(Identity),
}

impl AuthOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthOutcome::Unauthenticated => "unauthenticated",
            AuthOutcome::InvalidCredential(_) => "invalid_credential",
            AuthOutcome::UnknownSubject => "unknown_subject",
            AuthOutcome::Authenticated(_) => "authenticated",
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            AuthOutcome::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }
}

/// Interceptor decision: continue down the chain or short-circuit
#[derive(Debug)]
pub enum Decision {
    Continue(AuthOutcome),
    Reject(AuthError),
}

/// Bridges requests to the token codec and the identity backend
#[derive(Clone)]
pub struct Authenticator {
    codec: Arc<TokenCodec>,
    lookup: Arc<dyn IdentityLookup>,
    lookup_timeout: Duration,
}

impl Authenticator {
    pub fn new(
        codec: Arc<TokenCodec>,
        lookup: Arc<dyn IdentityLookup>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            codec,
            lookup,
            lookup_timeout,
        }
    }

    /// Authenticate one request's header value at `now`.
    ///
    /// An identity already attached to `ctx` is returned as is, without
    /// decoding the header again.
    pub async fn authenticate(
        &self,
        header: Option<&str>,
        now: DateTime<Utc>,
        ctx: &mut AuthContext,
    ) -> Result<AuthOutcome, AuthError> {
        if let Some(existing) = ctx.identity() {
            debug!("Identity already attached: {}", existing.subject);
            return Ok(AuthOutcome::Authenticated(existing.clone()));
        }

        let Some(token) = extract_bearer_token(header) else {
            return Ok(AuthOutcome::Unauthenticated);
        };

        let claims = match self.codec.verify(token, now) {
            Ok(claims) => claims,
            Err(e) => {
                debug!("Bearer token rejected: {}", e);
                return Ok(AuthOutcome::InvalidCredential(e));
            }
        };

        let lookup = tokio::time::timeout(self.lookup_timeout, self.lookup.lookup(&claims.sub));
        let identity = match lookup.await {
            Ok(Ok(identity)) if identity.subject == claims.sub => identity,
            Ok(Ok(identity)) => {
                warn!(
                    "Identity lookup for {} returned mismatched subject {}",
                    claims.sub, identity.subject
                );
                return Ok(AuthOutcome::UnknownSubject);
            }
            Ok(Err(LookupError::NotFound(subject))) => {
                debug!("Unknown token subject: {}", subject);
                return Ok(AuthOutcome::UnknownSubject);
            }
            Ok(Err(LookupError::Unavailable(reason))) => {
                warn!("Identity lookup failed for {}: {}", claims.sub, reason);
                return Err(AuthError::LookupUnavailable(reason));
            }
            Err(_) => {
                warn!(
                    "Identity lookup for {} timed out after {:?}",
                    claims.sub, self.lookup_timeout
                );
                return Err(AuthError::LookupUnavailable(format!(
                    "lookup timed out after {:?}",
                    self.lookup_timeout
                )));
            }
        };

        ctx.attach(identity.clone());
        debug!("Authenticated subject: {}", identity.subject);
        Ok(AuthOutcome::Authenticated(identity))
    }

    /// Run the authenticator as a pipeline step over request headers.
    ///
    /// Only an identity backend failure short-circuits; every other
    /// outcome continues and leaves the decision to authorization.
    pub async fn intercept(
        &self,
        headers: &HeaderMap,
        ctx: &mut AuthContext,
        now: DateTime<Utc>,
    ) -> Decision {
        let header = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok());

        match self.authenticate(header, now, ctx).await {
            Ok(outcome) => {
                metrics::counter!("tollgate_auth_outcomes_total", "outcome" => outcome.as_str())
                    .increment(1);
                Decision::Continue(outcome)
            }
            Err(e) => {
                metrics::counter!("tollgate_auth_outcomes_total", "outcome" => "lookup_unavailable")
                    .increment(1);
                Decision::Reject(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use chrono::TimeZone;
    use std::collections::HashMap;

    pub(crate) const SECRET: &[u8] = b"test-secret-key-that-is-at-least-32-bytes";

    /// Lookup backed by a fixed map of subjects
    pub(crate) struct StaticLookup(pub HashMap<String, Identity>);

    impl StaticLookup {
        pub(crate) fn with(identities: Vec<Identity>) -> Self {
            Self(
                identities
                    .into_iter()
                    .map(|i| (i.subject.clone(), i))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl IdentityLookup for StaticLookup {
        async fn lookup(&self, subject: &str) -> Result<Identity, LookupError> {
            self.0
                .get(subject)
                .cloned()
                .ok_or_else(|| LookupError::NotFound(subject.to_string()))
        }
    }

    pub(crate) struct FailingLookup;

    #[async_trait]
    impl IdentityLookup for FailingLookup {
        async fn lookup(&self, _subject: &str) -> Result<Identity, LookupError> {
            Err(LookupError::Unavailable("connection refused".to_string()))
        }
    }

    struct SlowLookup;

    #[async_trait]
    impl IdentityLookup for SlowLookup {
        async fn lookup(&self, subject: &str) -> Result<Identity, LookupError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Identity::new(subject, ["ROLE_USER"]))
        }
    }

    pub(crate) fn alice() -> Identity {
        Identity::new("alice", ["ROLE_USER"])
    }

    pub(crate) fn codec() -> Arc<TokenCodec> {
        Arc::new(TokenCodec::new(SECRET, chrono::Duration::hours(1)).unwrap())
    }

    fn authenticator(lookup: Arc<dyn IdentityLookup>) -> Authenticator {
        Authenticator::new(codec(), lookup, Duration::from_millis(50))
    }

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {}", token)
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(None), None);
        assert_eq!(extract_bearer_token(Some("")), None);
        assert_eq!(extract_bearer_token(Some("abc.def.ghi")), None);
        assert_eq!(extract_bearer_token(Some("bearer abc.def.ghi")), None);
        assert_eq!(extract_bearer_token(Some("Basic dXNlcjpwYXNz")), None);
        assert_eq!(extract_bearer_token(Some("Bearer")), None);
        assert_eq!(
            extract_bearer_token(Some("Bearer abc.def.ghi")),
            Some("abc.def.ghi")
        );
        assert_eq!(extract_bearer_token(Some("Bearer  x")), Some(" x"));
    }

    #[test]
    fn test_context_attach_once() {
        let mut ctx = AuthContext::default();
        assert!(!ctx.is_authenticated());

        assert!(ctx.attach(alice()));
        assert!(!ctx.attach(Identity::new("mallory", ["ROLE_ADMIN"])));
        assert_eq!(ctx.identity().unwrap().subject, "alice");
    }

    #[tokio::test]
    async fn test_authenticated() {
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice()])));
        let token = codec().mint("alice", now()).unwrap();
        let mut ctx = AuthContext::default();

        let outcome = auth
            .authenticate(Some(bearer(&token).as_str()), now(), &mut ctx)
            .await
            .unwrap();

        assert_eq!(outcome.identity(), Some(&alice()));
        assert_eq!(ctx.identity(), Some(&alice()));
    }

    #[tokio::test]
    async fn test_missing_header_is_unauthenticated() {
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice()])));
        let mut ctx = AuthContext::default();

        for header in [None, Some(""), Some("Token abc")] {
            let outcome = auth.authenticate(header, now(), &mut ctx).await.unwrap();
            assert!(matches!(outcome, AuthOutcome::Unauthenticated));
        }
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid_credential() {
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice()])));
        let token = codec().mint("alice", now()).unwrap();
        let mut ctx = AuthContext::default();

        let outcome = auth
            .authenticate(
                Some(bearer(&token).as_str()),
                now() + chrono::Duration::hours(1),
                &mut ctx,
            )
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthOutcome::InvalidCredential(TokenError::Expired)
        ));
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_garbage_token_is_invalid_credential() {
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice()])));
        let mut ctx = AuthContext::default();

        let outcome = auth
            .authenticate(Some("Bearer not-a-token"), now(), &mut ctx)
            .await
            .unwrap();

        assert!(matches!(
            outcome,
            AuthOutcome::InvalidCredential(TokenError::MalformedToken)
        ));
    }

    #[tokio::test]
    async fn test_unknown_subject() {
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice()])));
        let token = codec().mint("bob", now()).unwrap();
        let mut ctx = AuthContext::default();

        let outcome = auth
            .authenticate(Some(bearer(&token).as_str()), now(), &mut ctx)
            .await
            .unwrap();

        assert!(matches!(outcome, AuthOutcome::UnknownSubject));
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_distinct() {
        let auth = authenticator(Arc::new(FailingLookup));
        let token = codec().mint("alice", now()).unwrap();
        let mut ctx = AuthContext::default();

        let result = auth
            .authenticate(Some(bearer(&token).as_str()), now(), &mut ctx)
            .await;

        assert!(matches!(result, Err(AuthError::LookupUnavailable(_))));
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_lookup_timeout_is_unavailable() {
        let auth = authenticator(Arc::new(SlowLookup));
        let token = codec().mint("alice", now()).unwrap();
        let mut ctx = AuthContext::default();

        let result = auth
            .authenticate(Some(bearer(&token).as_str()), now(), &mut ctx)
            .await;

        assert!(matches!(result, Err(AuthError::LookupUnavailable(_))));
        assert!(!ctx.is_authenticated());
    }

    #[tokio::test]
    async fn test_reentry_keeps_first_identity() {
        let bob = Identity::new("bob", ["ROLE_ADMIN"]);
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice(), bob])));
        let mut ctx = AuthContext::default();

        let alice_token = codec().mint("alice", now()).unwrap();
        let bob_token = codec().mint("bob", now()).unwrap();

        auth.authenticate(Some(bearer(&alice_token).as_str()), now(), &mut ctx)
            .await
            .unwrap();
        let second = auth
            .authenticate(Some(bearer(&bob_token).as_str()), now(), &mut ctx)
            .await
            .unwrap();

        assert_eq!(second.identity(), Some(&alice()));
        assert_eq!(ctx.identity(), Some(&alice()));
    }

    #[tokio::test]
    async fn test_intercept_decisions() {
        let auth = authenticator(Arc::new(StaticLookup::with(vec![alice()])));
        let token = codec().mint("alice", now()).unwrap();

        let mut headers = HeaderMap::new();
        let mut ctx = AuthContext::default();
        assert!(matches!(
            auth.intercept(&headers, &mut ctx, now()).await,
            Decision::Continue(AuthOutcome::Unauthenticated)
        ));

        headers.insert(AUTHORIZATION, HeaderValue::from_str(&bearer(&token)).unwrap());
        assert!(matches!(
            auth.intercept(&headers, &mut ctx, now()).await,
            Decision::Continue(AuthOutcome::Authenticated(_))
        ));

        let failing = authenticator(Arc::new(FailingLookup));
        let mut ctx = AuthContext::default();
        assert!(matches!(
            failing.intercept(&headers, &mut ctx, now()).await,
            Decision::Reject(AuthError::LookupUnavailable(_))
        ));
    }
}
