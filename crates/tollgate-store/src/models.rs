//! Store models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tollgate_auth::Identity;

/// User model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub authorities: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The identity this user authenticates as
    pub fn identity(&self) -> Identity {
        Identity {
            subject: self.username.clone(),
            authorities: self.authorities.clone(),
        }
    }
}

/// New user (for insertion)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub authorities: Vec<String>,
}
