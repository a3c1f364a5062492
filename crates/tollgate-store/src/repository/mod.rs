//! In-memory user repository

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tollgate_auth::{Identity, IdentityLookup, LookupError};

use crate::models::User;

mod users;

/// User directory shared across handlers
#[derive(Clone, Default)]
pub struct UserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl UserStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityLookup for UserStore {
    async fn lookup(&self, subject: &str) -> Result<Identity, LookupError> {
        self.users
            .read()
            .get(subject)
            .map(User::identity)
            .ok_or_else(|| LookupError::NotFound(subject.to_string()))
    }
}
