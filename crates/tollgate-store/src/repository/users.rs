//! User operations

use chrono::Utc;
use tracing::debug;

use crate::error::StoreError;
use crate::models::{NewUser, User};
use crate::repository::UserStore;

/// Maximum allowed username length
const MAX_USERNAME_LENGTH: usize = 64;

/// Validate username format and length
fn validate_username(username: &str) -> Result<(), StoreError> {
    if username.is_empty() {
        return Err(StoreError::InvalidRecord("Username cannot be empty".to_string()));
    }
    if username.len() > MAX_USERNAME_LENGTH {
        return Err(StoreError::InvalidRecord(format!(
            "Username exceeds maximum length of {} characters",
            MAX_USERNAME_LENGTH
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@'))
    {
        return Err(StoreError::InvalidRecord(format!(
            "Username '{}' contains unsupported characters",
            username
        )));
    }
    Ok(())
}

impl UserStore {
    // ==================== User Operations ====================

    /// Insert a new user
    pub fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        validate_username(&user.username)?;
        if user.password_hash.is_empty() {
            return Err(StoreError::InvalidRecord(format!(
                "User '{}' has no password hash",
                user.username
            )));
        }

        let mut users = self.users.write();
        if users.contains_key(&user.username) {
            return Err(StoreError::Duplicate(format!(
                "User '{}' already exists",
                user.username
            )));
        }

        let record = User {
            username: user.username,
            password_hash: user.password_hash,
            authorities: user.authorities.into_iter().collect(),
            created_at: Utc::now(),
        };
        users.insert(record.username.clone(), record.clone());

        debug!("Inserted user: {}", record.username);
        Ok(record)
    }

    /// Get a user by username
    pub fn get_user_by_username(&self, username: &str) -> Option<User> {
        self.users.read().get(username).cloned()
    }

    /// List all users
    pub fn list_users(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.read().values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        users
    }

    /// Check if any users exist
    pub fn has_users(&self) -> bool {
        !self.users.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tollgate_auth::{IdentityLookup, LookupError};

    fn new_user(username: &str, authorities: &[&str]) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNo".to_string(),
            authorities: authorities.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn test_insert_and_get() {
        let store = UserStore::new();
        assert!(!store.has_users());

        store.insert_user(new_user("alice", &["ROLE_USER"])).unwrap();

        let user = store.get_user_by_username("alice").unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.authorities.contains("ROLE_USER"));
        assert!(store.has_users());
        assert!(store.get_user_by_username("bob").is_none());
    }

    #[test]
    fn test_duplicate_user() {
        let store = UserStore::new();
        store.insert_user(new_user("alice", &[])).unwrap();

        assert!(matches!(
            store.insert_user(new_user("alice", &["ROLE_ADMIN"])),
            Err(StoreError::Duplicate(_))
        ));
        assert!(store.get_user_by_username("alice").unwrap().authorities.is_empty());
    }

    #[test]
    fn test_invalid_records() {
        let store = UserStore::new();

        assert!(matches!(
            store.insert_user(new_user("", &[])),
            Err(StoreError::InvalidRecord(_))
        ));
        assert!(matches!(
            store.insert_user(new_user("has space", &[])),
            Err(StoreError::InvalidRecord(_))
        ));
        assert!(matches!(
            store.insert_user(new_user(&"a".repeat(65), &[])),
            Err(StoreError::InvalidRecord(_))
        ));

        let mut no_hash = new_user("alice", &[]);
        no_hash.password_hash.clear();
        assert!(matches!(
            store.insert_user(no_hash),
            Err(StoreError::InvalidRecord(_))
        ));
        assert!(!store.has_users());
    }

    #[test]
    fn test_list_users_sorted() {
        let store = UserStore::new();
        store.insert_user(new_user("carol", &[])).unwrap();
        store.insert_user(new_user("alice", &[])).unwrap();
        store.insert_user(new_user("bob", &[])).unwrap();

        let names: Vec<String> = store.list_users().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test]
    async fn test_identity_lookup() {
        let store = UserStore::new();
        store
            .insert_user(new_user("alice", &["ROLE_USER", "ROLE_ADMIN"]))
            .unwrap();

        let identity = store.lookup("alice").await.unwrap();
        assert_eq!(identity.subject, "alice");
        assert!(identity.has_authority("ROLE_ADMIN"));

        assert_eq!(
            store.lookup("bob").await.unwrap_err(),
            LookupError::NotFound("bob".to_string())
        );
    }
}
