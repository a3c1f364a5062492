//! Authenticated identities and the lookup capability that resolves them

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::LookupError;

/// A resolved subject and its authorization set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub subject: String,
    pub authorities: BTreeSet<String>,
}

impl Identity {
    pub fn new<I, S>(subject: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: subject.into(),
            authorities: authorities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

/// Resolves a token subject to an identity.
///
/// Implementations may hit a data store. `NotFound` means the subject does
/// not exist; `Unavailable` means the backend itself failed.
#[async_trait]
pub trait IdentityLookup: Send + Sync {
    async fn lookup(&self, subject: &str) -> Result<Identity, LookupError>;
}
