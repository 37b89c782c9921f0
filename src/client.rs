//! The client half of the digest exchange: read a challenge, answer it.
//!
//! Only what [`DigestVerifier`](crate::DigestVerifier) issues is understood:
//! MD5 with `qop=auth`. Used to drive verifiers end to end.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::grammar::parse_digest_params;
use crate::nonce::generate_nonce;
use crate::utils::QuoteForDigest;
use crate::{Algorithm, DigestInput, Error, HttpMethod, Qop, Result};

//region AuthContext

/// One login attempt.
#[derive(Debug)]
pub struct AuthContext<'a> {
    pub username: &'a str,
    /// Plain password
    pub password: &'a str,
    /// Request target, path plus optional `?query`
    pub uri: &'a str,
    pub method: HttpMethod<'a>,
    /// Fixed client nonce; a random one is generated when unset
    pub cnonce: Option<&'a str>,
}

impl<'a> AuthContext<'a> {
    /// Context for a GET request
    pub fn new(username: &'a str, password: &'a str, uri: &'a str) -> Self {
        Self::new_with_method(username, password, uri, HttpMethod::GET)
    }

    pub fn new_with_method(
        username: &'a str,
        password: &'a str,
        uri: &'a str,
        method: HttpMethod<'a>,
    ) -> Self {
        Self {
            username,
            password,
            uri,
            method,
            cnonce: None,
        }
    }

    pub fn set_custom_cnonce(&mut self, cnonce: &'a str) {
        self.cnonce = Some(cnonce);
    }
}

//endregion

//region WwwAuthenticateHeader

/// A parsed `WWW-Authenticate: Digest` challenge.
#[derive(Debug, PartialEq, Eq)]
pub struct WwwAuthenticateHeader {
    pub realm: String,
    pub nonce: String,
    /// Echoed back unchanged
    pub opaque: Option<String>,
    /// Requests answered with this nonce so far
    pub nc: u32,
}

impl WwwAuthenticateHeader {
    /// Parse a challenge header value, with or without the `Digest` token.
    ///
    /// # Errors
    /// If `realm`, `nonce` or `qop` is missing, `auth` is not offered, or
    /// an algorithm other than MD5 is named
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let mut kv = parse_digest_params(input.strip_prefix("Digest").unwrap_or(input));

        if let Some(algorithm) = kv.get("algorithm") {
            if Algorithm::from_str(algorithm)? != Algorithm::MD5 {
                return Err(Error::UnsupportedAlgorithm(algorithm.clone()));
            }
        }

        let offered = kv.remove("qop").ok_or(Error::MissingParameter("qop"))?;
        if !offered
            .split(',')
            .any(|q| Qop::from_str(q.trim()) == Ok(Qop::AUTH))
        {
            return Err(Error::UnsupportedQop(offered));
        }

        Ok(Self {
            realm: kv.remove("realm").ok_or(Error::MissingParameter("realm"))?,
            nonce: kv.remove("nonce").ok_or(Error::MissingParameter("nonce"))?,
            opaque: kv.remove("opaque"),
            nc: 0,
        })
    }

    /// Answer the challenge, bumping [`nc`](Self::nc).
    pub fn respond<'a>(&'a mut self, context: &AuthContext<'_>) -> AuthorizationHeader<'a> {
        AuthorizationHeader::from_prompt(self, context)
    }
}

impl FromStr for WwwAuthenticateHeader {
    type Err = Error;

    fn from_str(input: &str) -> Result<Self> {
        Self::parse(input)
    }
}

//endregion

//region AuthorizationHeader

/// `Authorization: Digest` value answering a challenge.
#[derive(Debug)]
pub struct AuthorizationHeader<'ctx> {
    pub prompt: &'ctx WwwAuthenticateHeader,
    /// Computed `response` hash
    pub response: String,
    pub username: String,
    pub uri: String,
    pub cnonce: String,
    pub nc: u32,
}

impl<'a> AuthorizationHeader<'a> {
    pub fn from_prompt(
        prompt: &'a mut WwwAuthenticateHeader,
        context: &AuthContext<'_>,
    ) -> AuthorizationHeader<'a> {
        prompt.nc += 1;

        let cnonce = context
            .cnonce
            .map_or_else(generate_nonce, ToOwned::to_owned);
        let nc = format!("{:08x}", prompt.nc);

        let response = DigestInput {
            username: context.username,
            realm: &prompt.realm,
            password: context.password,
            method: context.method,
            uri: context.uri,
            nonce: &prompt.nonce,
            nc: &nc,
            cnonce: &cnonce,
        }
        .response(Algorithm::MD5);

        let prompt: &'a WwwAuthenticateHeader = prompt;
        AuthorizationHeader {
            nc: prompt.nc,
            prompt,
            response,
            username: context.username.to_owned(),
            uri: context.uri.to_owned(),
            cnonce,
        }
    }

    /// Same as the `Display` output
    pub fn to_header_string(&self) -> String {
        self.to_string()
    }
}

impl<'a> Display for AuthorizationHeader<'a> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Digest username=\"{}\", realm=\"{}\", nonce=\"{}\", uri=\"{}\"",
            self.username.quote_for_digest(),
            self.prompt.realm.quote_for_digest(),
            self.prompt.nonce.quote_for_digest(),
            self.uri.quote_for_digest()
        )?;
        write!(
            f,
            ", qop={}, nc={:08x}, cnonce=\"{}\", response=\"{}\"",
            Qop::AUTH,
            self.nc,
            self.cnonce.quote_for_digest(),
            self.response
        )?;

        if let Some(opaque) = &self.prompt.opaque {
            write!(f, ", opaque=\"{}\"", opaque.quote_for_digest())?;
        }

        write!(f, ", algorithm={}", Algorithm::MD5)
    }
}

//endregion

//region TESTS

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AuthRequest, DigestConfig, DigestVerifier, MemoryCredentialStore, Outcome};

    const RFC7616_CHALLENGE: &str = r#"Digest realm="http-auth@example.org", qop="auth, auth-int", algorithm=MD5,
        nonce="7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v",
        opaque="FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS""#;

    fn verifier(realm: &str) -> DigestVerifier<MemoryCredentialStore> {
        let store = MemoryCredentialStore::new("HTTPDigest").with_user("Mary", "qwerasdf");
        DigestVerifier::new(
            DigestConfig::default()
                .with_realm(realm)
                .with_opaque("0a0b0c0d"),
            store,
        )
    }

    #[test]
    fn test_parse_challenge() {
        let prompt = WwwAuthenticateHeader::parse(RFC7616_CHALLENGE).unwrap();
        assert_eq!(
            prompt,
            WwwAuthenticateHeader {
                realm: "http-auth@example.org".into(),
                nonce: "7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v".into(),
                opaque: Some("FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS".into()),
                nc: 0,
            }
        );

        let prompt: WwwAuthenticateHeader = r#"realm="a", nonce="b", qop=auth"#.parse().unwrap();
        assert_eq!(prompt.realm, "a");
        assert_eq!(prompt.opaque, None);
    }

    #[test]
    fn test_unanswerable_challenges() {
        assert_eq!(
            WwwAuthenticateHeader::parse(r#"Digest nonce="b", qop="auth""#),
            Err(Error::MissingParameter("realm"))
        );
        assert_eq!(
            WwwAuthenticateHeader::parse(r#"Digest realm="a", nonce="b""#),
            Err(Error::MissingParameter("qop"))
        );
        assert_eq!(
            WwwAuthenticateHeader::parse(r#"Digest realm="a", nonce="b", qop="auth-int""#),
            Err(Error::UnsupportedQop("auth-int".into()))
        );
        assert_eq!(
            WwwAuthenticateHeader::parse(r#"Digest realm="a", nonce="b", qop=auth, algorithm=SHA-256"#),
            Err(Error::UnsupportedAlgorithm("SHA-256".into()))
        );
        assert_eq!(
            WwwAuthenticateHeader::parse(r#"Digest realm="a", nonce="b", qop=auth, algorithm=SHA-1"#),
            Err(Error::UnsupportedAlgorithm("SHA-1".into()))
        );
    }

    #[test]
    fn test_rfc7616_md5_vector() {
        let mut context = AuthContext::new("Mufasa", "Circle of Life", "/dir/index.html");
        context.set_custom_cnonce("f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ");

        let mut prompt = WwwAuthenticateHeader::parse(RFC7616_CHALLENGE).unwrap();

        let answer = prompt.respond(&context);
        assert_eq!(answer.response, "8ca523f5e9506fed4657c9700eebdbec");
        assert_eq!(
            answer.to_header_string(),
            "Digest username=\"Mufasa\", realm=\"http-auth@example.org\", \
             nonce=\"7ypf/xlj9XXwfDPEoM4URrv/xwf94BcCAzFZH4GiTo0v\", uri=\"/dir/index.html\", \
             qop=auth, nc=00000001, cnonce=\"f2/wE4q74E6zIJEtWaHKaf5wv/H5QzzpXusqGemxURZJ\", \
             response=\"8ca523f5e9506fed4657c9700eebdbec\", \
             opaque=\"FQhe/qaU925kfnzjCev0ciny7QMkPqMAFRtzCUYo5tdS\", algorithm=MD5"
        );

        // nc goes into the hash
        let answer = prompt.respond(&context);
        assert_eq!(answer.nc, 2);
        assert_eq!(answer.response, "4b5d595ecf2db9df612ea5b45cd97101");
    }

    #[test]
    fn test_random_cnonce() {
        let mut prompt = WwwAuthenticateHeader::parse(RFC7616_CHALLENGE).unwrap();
        let context = AuthContext::new("Mufasa", "Circle of Life", "/dir/index.html");

        let first = prompt.respond(&context).cnonce;
        let second = prompt.respond(&context).cnonce;
        assert_eq!(first.len(), 32);
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_round_trip_against_verifier() {
        let verifier = verifier("test");

        // first request carries nothing and gets challenged
        let first = verifier.authenticate(&AuthRequest::get("/private/api/data?x=1")).await;
        let mut prompt = WwwAuthenticateHeader::parse(first.challenge().unwrap()).unwrap();
        assert_eq!(prompt.opaque.as_deref(), Some("0a0b0c0d"));
        assert_eq!(prompt.nonce.len(), 32);

        for method in ["GET", "DELETE"] {
            let context = AuthContext::new_with_method(
                "Mary",
                "qwerasdf",
                "/private/api/data?x=1",
                HttpMethod::from(method),
            );
            let authorization = prompt.respond(&context).to_string();

            let request = AuthRequest::new(method, "/private/api/data?x=1")
                .with_authorization(authorization);
            let outcome = verifier.authenticate(&request).await;
            assert!(outcome.is_authenticated(), "{}", method);
        }

        let context = AuthContext::new("Mary", "wrong", "/private/api/data?x=1");
        let authorization = prompt.respond(&context).to_string();
        let request = AuthRequest::get("/private/api/data?x=1").with_authorization(authorization);
        assert!(matches!(
            verifier.authenticate(&request).await,
            Outcome::Unauthorized { .. }
        ));
    }

    #[tokio::test]
    async fn test_round_trip_with_escaped_realm() {
        for realm in [r"corp\users", r#"say "hi""#, r#"a\"b, c"#] {
            let verifier = verifier(realm);

            let first = verifier.authenticate(&AuthRequest::get("/private/api/data")).await;
            let mut prompt = WwwAuthenticateHeader::parse(first.challenge().unwrap()).unwrap();
            assert_eq!(prompt.realm, realm);

            let context = AuthContext::new("Mary", "qwerasdf", "/private/api/data");
            let authorization = prompt.respond(&context).to_string();

            let request = AuthRequest::get("/private/api/data").with_authorization(authorization);
            assert!(
                verifier.authenticate(&request).await.is_authenticated(),
                "{}",
                realm
            );
        }
    }
}

//endregion
