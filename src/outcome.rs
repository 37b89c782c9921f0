use http::header::{HeaderName, WWW_AUTHENTICATE};
use http::StatusCode;

/// Identity of an authenticated user, as built by the credential lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Unique user identifier
    pub id: String,
    /// Human readable name
    pub display_name: String,
    /// Name of the authentication scheme that vouched for the user
    pub provider: String,
}

impl UserProfile {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            provider: provider.into(),
        }
    }
}

/// Response headers an authenticator asks the host to set.
pub type ChallengeHeaders = Vec<(HeaderName, String)>;

/// A single `WWW-Authenticate` header.
pub fn www_authenticate(value: String) -> ChallengeHeaders {
    vec![(WWW_AUTHENTICATE, value)]
}

/// Decision reached for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Credentials verified
    Authenticated(UserProfile),
    /// Credentials understood but wrong, or unknown user (401)
    Unauthorized {
        status: StatusCode,
        headers: ChallengeHeaders,
    },
    /// Credentials present for this scheme but unusable (400)
    Malformed { status: StatusCode },
    /// Nothing for this scheme in the request; let another authenticator try
    Pass {
        status: StatusCode,
        headers: ChallengeHeaders,
    },
}

impl Outcome {
    pub fn unauthorized(headers: ChallengeHeaders) -> Self {
        Outcome::Unauthorized {
            status: StatusCode::UNAUTHORIZED,
            headers,
        }
    }

    pub fn malformed() -> Self {
        Outcome::Malformed {
            status: StatusCode::BAD_REQUEST,
        }
    }

    pub fn pass(headers: ChallengeHeaders) -> Self {
        Outcome::Pass {
            status: StatusCode::UNAUTHORIZED,
            headers,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Outcome::Authenticated(_))
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass { .. })
    }

    /// Status the host should answer with, `None` after a success.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Outcome::Authenticated(_) => None,
            Outcome::Unauthorized { status, .. }
            | Outcome::Malformed { status }
            | Outcome::Pass { status, .. } => Some(*status),
        }
    }

    /// Headers the host should add to its response.
    pub fn headers(&self) -> &[(HeaderName, String)] {
        match self {
            Outcome::Unauthorized { headers, .. } | Outcome::Pass { headers, .. } => headers,
            Outcome::Authenticated(_) | Outcome::Malformed { .. } => &[],
        }
    }

    /// Value of the `WWW-Authenticate` header, if one was produced.
    pub fn challenge(&self) -> Option<&str> {
        self.headers()
            .iter()
            .find(|(name, _)| *name == WWW_AUTHENTICATE)
            .map(|(_, value)| value.as_str())
    }
}

/// Receiver of authentication decisions, owned by the host middleware.
pub trait AuthResultSink {
    fn report(&mut self, outcome: Outcome);
}

impl AuthResultSink for Vec<Outcome> {
    fn report(&mut self, outcome: Outcome) {
        self.push(outcome);
    }
}

impl AuthResultSink for Option<Outcome> {
    fn report(&mut self, outcome: Outcome) {
        *self = Some(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_headers() {
        let outcome = Outcome::unauthorized(www_authenticate(r#"Basic realm="test""#.into()));
        assert_eq!(outcome.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(outcome.challenge(), Some(r#"Basic realm="test""#));

        let outcome = Outcome::malformed();
        assert_eq!(outcome.status(), Some(StatusCode::BAD_REQUEST));
        assert!(outcome.headers().is_empty());

        let outcome = Outcome::Authenticated(UserProfile::new("Mary", "Mary", "HTTPBasic"));
        assert!(outcome.is_authenticated());
        assert_eq!(outcome.status(), None);
    }
}
