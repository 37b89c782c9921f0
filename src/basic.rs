use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::{debug, info};

use crate::outcome::www_authenticate;
use crate::utils::{ct_eq, QuoteForDigest};
use crate::{
    AuthResultSink, BasicConfig, CacheKey, ChallengeHeaders, CredentialCache, CredentialLookup,
    Error, Outcome, PasswordVerifier, RequestParts, Result, UserProfile,
};

/// Provider name of the basic scheme
pub const PROVIDER: &str = "HTTPBasic";

/// Authorization scheme token
pub const SCHEME: &str = "Basic";

/// How a [`BasicVerifier`] decides whether a password is right.
#[derive(Clone)]
pub enum BasicStrategy {
    /// Fetch the stored password and compare it here. Verified pairs are
    /// remembered in the cache, when one is set.
    Lookup {
        loader: Arc<dyn CredentialLookup>,
        cache: Option<Arc<dyn CredentialCache>>,
    },
    /// Hand identifier and password to the application, which answers with
    /// an identity or a refusal. Nothing is cached.
    Verify(Arc<dyn PasswordVerifier>),
}

impl fmt::Debug for BasicStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicStrategy::Lookup { cache, .. } => f
                .debug_struct("Lookup")
                .field("cached", &cache.is_some())
                .finish(),
            BasicStrategy::Verify(_) => f.write_str("Verify"),
        }
    }
}

/// Where the credentials of a request came from
enum Extracted {
    Found(String),
    /// Nothing usable for this scheme
    Absent,
}

/// Authenticates requests with `Authorization: Basic ...` (RFC 7617) or
/// user-info embedded in the URL.
#[derive(Debug, Clone)]
pub struct BasicVerifier {
    realm: String,
    strategy: BasicStrategy,
}

impl BasicVerifier {
    pub fn new(config: BasicConfig, strategy: BasicStrategy) -> Self {
        Self {
            realm: config.realm,
            strategy,
        }
    }

    /// Verifier comparing against passwords from `loader`, without a cache
    pub fn with_lookup(config: BasicConfig, loader: impl CredentialLookup + 'static) -> Self {
        Self::new(
            config,
            BasicStrategy::Lookup {
                loader: Arc::new(loader),
                cache: None,
            },
        )
    }

    /// Verifier comparing against passwords from `loader`, memoizing
    /// verified pairs in `cache`
    pub fn with_cached_lookup(
        config: BasicConfig,
        loader: impl CredentialLookup + 'static,
        cache: Arc<dyn CredentialCache>,
    ) -> Self {
        Self::new(
            config,
            BasicStrategy::Lookup {
                loader: Arc::new(loader),
                cache: Some(cache),
            },
        )
    }

    /// Verifier delegating the whole decision to `verifier`
    pub fn with_verifier(config: BasicConfig, verifier: impl PasswordVerifier + 'static) -> Self {
        Self::new(config, BasicStrategy::Verify(Arc::new(verifier)))
    }

    pub fn realm(&self) -> &str {
        &self.realm
    }

    pub fn strategy(&self) -> &BasicStrategy {
        &self.strategy
    }

    /// The `WWW-Authenticate: Basic realm="..."` header
    pub fn challenge_headers(&self) -> ChallengeHeaders {
        www_authenticate(format!(
            "{} realm=\"{}\"",
            SCHEME,
            self.realm.quote_for_digest()
        ))
    }

    /// `user:password` from the URL user-info, else from the header.
    fn extract<R: RequestParts + ?Sized>(request: &R) -> Extracted {
        if let Some(user_info) = request.user_info() {
            return Extracted::Found(user_info.to_string());
        }

        let header = match request.authorization() {
            Some(header) => header,
            None => return Extracted::Absent,
        };

        let mut parts = header.split(' ');
        if parts.next() != Some(SCHEME) {
            return Extracted::Absent;
        }

        let decoded = match parts.next().map(|token| STANDARD.decode(token)) {
            Some(Ok(decoded)) => decoded,
            _ => return Extracted::Absent,
        };

        match String::from_utf8(decoded) {
            Ok(text) => Extracted::Found(text),
            Err(_) => Extracted::Absent,
        }
    }

    /// Split decoded credentials on the first `:`.
    pub fn split_credentials(credentials: &str) -> Result<(&str, &str)> {
        credentials.split_once(':').ok_or(Error::MissingSeparator)
    }

    async fn verify(&self, user_id: &str, password: &str) -> Option<UserProfile> {
        match &self.strategy {
            BasicStrategy::Lookup { loader, cache } => {
                let key = CacheKey::new(user_id, password);

                if let Some(profile) = cache.as_ref().and_then(|cache| cache.get(&key)) {
                    debug!(user = %user_id, "basic credentials served from cache");
                    return Some(profile);
                }

                let stored = loader.lookup(user_id).await?;
                if !ct_eq(&stored.password, password) {
                    return None;
                }

                if let Some(cache) = cache {
                    cache.insert(key, stored.profile.clone());
                }
                Some(stored.profile)
            }
            BasicStrategy::Verify(verifier) => verifier.verify(user_id, password).await,
        }
    }

    /// Run the whole check for one request.
    pub async fn authenticate<R: RequestParts + ?Sized>(&self, request: &R) -> Outcome {
        let credentials = match Self::extract(request) {
            Extracted::Found(credentials) => credentials,
            Extracted::Absent => return Outcome::pass(self.challenge_headers()),
        };

        let (user_id, password) = match Self::split_credentials(&credentials) {
            Ok(split) => split,
            Err(err) => {
                debug!(realm = %self.realm, error = %err, "malformed basic credentials");
                return Outcome::malformed();
            }
        };

        match self.verify(user_id, password).await {
            Some(profile) => {
                info!(user = %user_id, realm = %self.realm, "basic authentication succeeded");
                Outcome::Authenticated(profile)
            }
            None => {
                debug!(user = %user_id, "basic credentials rejected");
                Outcome::unauthorized(self.challenge_headers())
            }
        }
    }

    /// Like [`authenticate`](Self::authenticate), reporting to `sink`.
    pub async fn authenticate_into<R, S>(&self, request: &R, sink: &mut S)
    where
        R: RequestParts + ?Sized,
        S: AuthResultSink + ?Sized,
    {
        sink.report(self.authenticate(request).await);
    }
}
