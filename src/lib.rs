//! Server-side HTTP Basic (RFC 7617) and Digest (RFC 7616) authenticators.
//!
//! Each verifier looks at one inbound request, pulls the credentials out of the
//! `Authorization` header (or the URL user-info, for Basic), checks them with an
//! application-supplied [`CredentialLookup`] and reports an [`Outcome`]:
//! authenticated, unauthorized, malformed, or a pass that leaves the request to
//! another authenticator.
//!
//! The digest verifier only speaks MD5 with `qop=auth`. Nonces are random per
//! challenge and are not tracked, so there is no replay or expiry window.
//!
//! # Examples
//!
//! ```
//! use http_credentials::{AuthRequest, DigestConfig, DigestVerifier, MemoryCredentialStore, Outcome};
//!
//! # tokio_test_block_on(async {
//! let users = MemoryCredentialStore::new("HTTPDigest").with_user("Mary", "qwerasdf");
//! let verifier = DigestVerifier::new(
//!     DigestConfig::default().with_realm("test").with_opaque("0a0b0c0d"),
//!     users,
//! );
//!
//! let request = AuthRequest::get("/private/api/data").with_authorization(
//!     r#"Digest username="Mary", realm="test", nonce="dcd98b7102dd2f0e8b11d0f600bfb0c093",
//!        uri="/private/api/data", qop=auth, nc=00000001, cnonce="0a4f113b",
//!        response="59e3cce95566f4dd0262d812a12b9bb6", opaque="0a0b0c0d""#,
//! );
//!
//! match verifier.authenticate(&request).await {
//!     Outcome::Authenticated(profile) => assert_eq!(profile.id, "Mary"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

mod basic;
mod cache;
mod chain;
mod client;
mod config;
mod digest;
mod enums;
mod error;
mod grammar;
mod lookup;
mod nonce;
mod outcome;
mod request;
mod utils;

pub use error::{Error, Result};

pub use crate::basic::{BasicStrategy, BasicVerifier};
pub use crate::cache::{CacheKey, CredentialCache, MemoryCredentialCache};
pub use crate::chain::{Authenticator, AuthenticatorChain};
pub use crate::client::{AuthContext, AuthorizationHeader, WwwAuthenticateHeader};
pub use crate::config::{BasicConfig, DigestConfig, DEFAULT_REALM};
pub use crate::digest::{Challenge, DigestCredentials, DigestInput, DigestVerifier};
pub use crate::enums::*;
pub use crate::grammar::parse_digest_params;
pub use crate::lookup::{CredentialLookup, MemoryCredentialStore, PasswordVerifier, StoredCredentials};
pub use crate::nonce::{generate_nonce, FALLBACK_NONCE};
pub use crate::outcome::{AuthResultSink, ChallengeHeaders, Outcome, UserProfile};
pub use crate::request::{AuthRequest, RequestParts};

/// Provider names stamped on profiles by the bundled schemes
pub mod provider {
    pub use crate::basic::PROVIDER as BASIC;
    pub use crate::digest::PROVIDER as DIGEST;
}

/// Parse the WWW-Authenticate header value of a digest challenge.
/// It's just a convenience method to call [`WwwAuthenticateHeader::parse()`].
pub fn parse(www_authenticate: &str) -> Result<WwwAuthenticateHeader> {
    WwwAuthenticateHeader::parse(www_authenticate)
}

#[cfg(test)]
#[tokio::test]
async fn test_challenge_respond_verify() {
    let users = MemoryCredentialStore::new(provider::DIGEST).with_user("Mufasa", "Circle of Life");
    let verifier = DigestVerifier::new(DigestConfig::default(), users);

    let challenge = verifier.challenge().issue();
    assert!(challenge.starts_with(r#"Digest realm="Users", nonce=""#));

    let mut context = AuthContext::new("Mufasa", "Circle of Life", "/dir/index.html");
    context.set_custom_cnonce("f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ");

    let mut prompt = crate::parse(&challenge).unwrap();
    let answer = prompt.respond(&context).to_string();

    let request = AuthRequest::get("/dir/index.html").with_authorization(answer);
    assert_eq!(
        verifier.authenticate(&request).await,
        Outcome::Authenticated(UserProfile::new("Mufasa", "Mufasa", "HTTPDigest"))
    );
}
