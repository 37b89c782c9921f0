use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use tracing::{debug, info};

use crate::grammar::parse_digest_params;
use crate::nonce::generate_nonce;
use crate::outcome::www_authenticate;
use crate::utils::{ct_eq, QuoteForDigest};
use crate::{
    Algorithm, AuthResultSink, ChallengeHeaders, CredentialLookup, DigestConfig, Error,
    HttpMethod, Outcome, Qop, RequestParts, Result,
};

/// Provider name of the digest scheme
pub const PROVIDER: &str = "HTTPDigest";

/// Authorization scheme token
pub const SCHEME: &str = "Digest";

//region Challenge

/// The fixed part of every `WWW-Authenticate: Digest` header a verifier sends.
///
/// Created once per verifier; only the nonce changes between emissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Protection space label
    pub realm: String,
    /// Token the client has to echo back unchanged
    pub opaque: Option<String>,
    /// Always MD5
    pub algorithm: Algorithm,
    /// Always `auth`
    pub qop: Qop,
}

impl Challenge {
    pub fn new(realm: impl Into<String>, opaque: Option<String>) -> Self {
        Self {
            realm: realm.into(),
            opaque,
            algorithm: Algorithm::MD5,
            qop: Qop::AUTH,
        }
    }

    /// Render the header value around the given nonce
    pub fn header_value(&self, nonce: &str) -> String {
        IssuedChallenge {
            challenge: self,
            nonce,
        }
        .to_string()
    }

    /// Render the header value around a freshly generated nonce
    pub fn issue(&self) -> String {
        self.header_value(&generate_nonce())
    }
}

struct IssuedChallenge<'a> {
    challenge: &'a Challenge,
    nonce: &'a str,
}

impl<'a> Display for IssuedChallenge<'a> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(
            f,
            "{} realm=\"{}\", nonce=\"{}\"",
            SCHEME,
            self.challenge.realm.quote_for_digest(),
            self.nonce
        )?;

        if let Some(opaque) = &self.challenge.opaque {
            write!(f, ", opaque=\"{}\"", opaque.quote_for_digest())?;
        }

        write!(
            f,
            ", algorithm=\"{}\", qop=\"{}\"",
            self.challenge.algorithm, self.challenge.qop
        )
    }
}

//endregion

//region Response computation

/// Everything that goes into the `response` hash for `qop=auth`.
#[derive(Debug, Clone, Copy)]
pub struct DigestInput<'a> {
    pub username: &'a str,
    pub realm: &'a str,
    /// Plain password
    pub password: &'a str,
    pub method: HttpMethod<'a>,
    /// Request target as echoed in the `uri` parameter
    pub uri: &'a str,
    pub nonce: &'a str,
    /// Nonce count, 8 hex digits
    pub nc: &'a str,
    pub cnonce: &'a str,
}

impl<'a> DigestInput<'a> {
    /// `H(username:realm:password)`
    pub fn ha1(&self, algo: Algorithm) -> String {
        algo.hash_str(&format!(
            "{name}:{realm}:{pw}",
            name = self.username,
            realm = self.realm,
            pw = self.password
        ))
    }

    /// `H(method:uri)`
    pub fn ha2(&self, algo: Algorithm) -> String {
        algo.hash_str(&format!(
            "{method}:{uri}",
            method = self.method,
            uri = self.uri
        ))
    }

    /// The lowercase hex `response` value
    pub fn response(&self, algo: Algorithm) -> String {
        algo.hash_str(&format!(
            "{ha1}:{nonce}:{nc}:{cnonce}:{qop}:{ha2}",
            ha1 = self.ha1(algo),
            nonce = self.nonce,
            nc = self.nc,
            cnonce = self.cnonce,
            qop = Qop::AUTH,
            ha2 = self.ha2(algo)
        ))
    }
}

//endregion

//region Verifier

/// Credentials of one request that passed every check short of the hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestCredentials {
    pub username: String,
    pub realm: String,
    pub uri: String,
    pub nonce: String,
    pub cnonce: String,
    pub nc: String,
    pub qop: Qop,
    pub response: String,
}

impl DigestCredentials {
    fn input<'a>(&'a self, method: &'a str, password: &'a str) -> DigestInput<'a> {
        DigestInput {
            username: &self.username,
            realm: &self.realm,
            password,
            method: HttpMethod::from(method),
            uri: &self.uri,
            nonce: &self.nonce,
            nc: &self.nc,
            cnonce: &self.cnonce,
        }
    }
}

fn take(params: &mut HashMap<String, String>, name: &'static str) -> Result<String> {
    params.remove(name).ok_or(Error::MissingParameter(name))
}

/// Authenticates requests carrying `Authorization: Digest ...` (RFC 7616,
/// MD5 with `qop=auth`).
///
/// Nonces are random per challenge and not remembered, so a captured
/// response can be replayed for as long as the password stays the same.
#[derive(Debug)]
pub struct DigestVerifier<L> {
    challenge: Challenge,
    loader: L,
}

impl<L: CredentialLookup> DigestVerifier<L> {
    pub fn new(config: DigestConfig, loader: L) -> Self {
        Self {
            challenge: Challenge::new(config.realm, config.opaque),
            loader,
        }
    }

    pub fn challenge(&self) -> &Challenge {
        &self.challenge
    }

    pub fn realm(&self) -> &str {
        &self.challenge.realm
    }

    /// A `WWW-Authenticate` header with a new nonce
    pub fn challenge_headers(&self) -> ChallengeHeaders {
        www_authenticate(self.challenge.issue())
    }

    /// Strip the scheme token. `None` if the header is for another scheme.
    fn strip_scheme(header: &str) -> Option<&str> {
        let rest = header.strip_prefix(SCHEME)?;
        if rest.is_empty() || rest.starts_with(char::is_whitespace) {
            Some(rest)
        } else {
            None
        }
    }

    /// Check parsed parameters against this verifier and the request.
    pub fn validate<R: RequestParts + ?Sized>(
        &self,
        mut params: HashMap<String, String>,
        request: &R,
    ) -> Result<DigestCredentials> {
        if params.is_empty() {
            return Err(Error::EmptyCredentials);
        }

        let credentials = DigestCredentials {
            username: take(&mut params, "username")?,
            realm: take(&mut params, "realm")?,
            uri: take(&mut params, "uri")?,
            nonce: take(&mut params, "nonce")?,
            cnonce: take(&mut params, "cnonce")?,
            nc: take(&mut params, "nc")?,
            qop: match take(&mut params, "qop")?.parse::<Qop>()? {
                Qop::AUTH => Qop::AUTH,
                other => return Err(Error::UnsupportedQop(other.to_string())),
            },
            response: take(&mut params, "response")?,
        };

        if credentials.realm != self.challenge.realm {
            return Err(Error::RealmMismatch(credentials.realm));
        }

        if credentials.uri != request.request_target() {
            return Err(Error::UriMismatch(credentials.uri));
        }

        if let Some(opaque) = &self.challenge.opaque {
            if params.get("opaque") != Some(opaque) {
                return Err(Error::OpaqueMismatch);
            }
        }

        if let Some(algorithm) = params.get("algorithm") {
            if Algorithm::from_str(algorithm)? != self.challenge.algorithm {
                return Err(Error::UnsupportedAlgorithm(algorithm.clone()));
            }
        }

        Ok(credentials)
    }

    /// Run the whole check for one request.
    pub async fn authenticate<R: RequestParts + ?Sized>(&self, request: &R) -> Outcome {
        let params = match request.authorization().and_then(Self::strip_scheme) {
            Some(rest) => parse_digest_params(rest),
            None => return Outcome::pass(self.challenge_headers()),
        };

        let credentials = match self.validate(params, request) {
            Ok(credentials) => credentials,
            Err(err) => {
                debug!(realm = %self.realm(), error = %err, "malformed digest credentials");
                return Outcome::malformed();
            }
        };

        let stored = match self.loader.lookup(&credentials.username).await {
            Some(stored) => stored,
            None => {
                debug!(user = %credentials.username, "unknown digest user");
                return Outcome::unauthorized(self.challenge_headers());
            }
        };

        let expected = credentials
            .input(request.method(), &stored.password)
            .response(self.challenge.algorithm);

        if ct_eq(&expected, &credentials.response) {
            info!(user = %credentials.username, realm = %self.realm(), "digest authentication succeeded");
            Outcome::Authenticated(stored.profile)
        } else {
            debug!(user = %credentials.username, "digest response mismatch");
            Outcome::unauthorized(self.challenge_headers())
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

//endregion

//region TESTS


//endregion
