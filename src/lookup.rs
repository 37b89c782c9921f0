//! Application-supplied credential backends.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::utils::ct_eq;
use crate::UserProfile;

/// What a credential lookup returns for a known user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub profile: UserProfile,
    /// Plain stored password, needed to recompute digests
    pub password: String,
}

/// Resolves a user identifier to the stored secret.
///
/// Unknown identifiers return `None`; implementations must not panic for
/// them. The call may suspend for as long as the backend needs.
#[async_trait]
pub trait CredentialLookup: Send + Sync {
    async fn lookup(&self, user_id: &str) -> Option<StoredCredentials>;
}

/// Verifies an identifier and password itself and builds the identity.
#[async_trait]
pub trait PasswordVerifier: Send + Sync {
    async fn verify(&self, user_id: &str, password: &str) -> Option<UserProfile>;
}

/// In-memory user table, mostly for tests and demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    users: HashMap<String, String>,
    provider: String,
}

impl MemoryCredentialStore {
    /// Empty store whose profiles name `provider` as their source.
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            users: HashMap::new(),
            provider: provider.into(),
        }
    }

    pub fn with_user(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.add(user, password);
        self
    }

    pub fn add(&mut self, user: impl Into<String>, password: impl Into<String>) {
        self.users.insert(user.into(), password.into());
    }

    fn profile(&self, user_id: &str) -> UserProfile {
        UserProfile::new(user_id, user_id, self.provider.as_str())
    }
}

#[async_trait]
impl CredentialLookup for MemoryCredentialStore {
    async fn lookup(&self, user_id: &str) -> Option<StoredCredentials> {
        self.users.get(user_id).map(|password| StoredCredentials {
            profile: self.profile(user_id),
            password: password.clone(),
        })
    }
}

#[async_trait]
impl PasswordVerifier for MemoryCredentialStore {
    async fn verify(&self, user_id: &str, password: &str) -> Option<UserProfile> {
        match self.users.get(user_id) {
            Some(stored) if ct_eq(stored, password) => Some(self.profile(user_id)),
            _ => None,
        }
    }
}
