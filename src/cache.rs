//! Memo of Basic credentials that already verified once.
//!
//! The cache is a collaborator: eviction, size bounds and expiry belong to the
//! implementation, the verifier only reads and inserts. A hit skips the
//! credential lookup entirely, so a password stays accepted for as long as
//! its entry survives.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::{Algorithm, UserProfile};

/// Key for a verified user id and password pair.
///
/// Only a SHA-256 fingerprint of the pair is kept, so an inspectable or
/// persisted cache never holds the password itself.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(user_id: &str, password: &str) -> Self {
        // user ids never contain ':', the Basic split guarantees it
        CacheKey(Algorithm::SHA2_256.hash_str(&format!("{}:{}", user_id, password)))
    }

    pub fn fingerprint(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CacheKey").field(&&self.0[..8]).finish()
    }
}

/// Concurrent store of verified credentials.
///
/// Inserting the same key twice must be harmless; the later value may win.
pub trait CredentialCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<UserProfile>;

    fn insert(&self, key: CacheKey, profile: UserProfile);
}

/// Unbounded in-memory cache; entries live until removed or cleared.
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialCache {
    entries: Arc<DashMap<CacheKey, UserProfile>>,
}

impl MemoryCredentialCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&self, key: &CacheKey) -> Option<UserProfile> {
        self.entries.remove(key).map(|(_, profile)| profile)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl CredentialCache for MemoryCredentialCache {
    fn get(&self, key: &CacheKey) -> Option<UserProfile> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn insert(&self, key: CacheKey, profile: UserProfile) {
        self.entries.insert(key, profile);
    }
}
