use std::result;

use thiserror::Error;

/// Reasons a credential header is rejected as malformed.
///
/// These never reach the host directly; the verifiers fold every variant into
/// [`Outcome::Malformed`](crate::Outcome::Malformed).
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no parameters in credentials")]
    EmptyCredentials,
    #[error("missing \"{0}\" in header")]
    MissingParameter(&'static str),
    #[error("realm does not match: {0}")]
    RealmMismatch(String),
    #[error("uri does not match request target: {0}")]
    UriMismatch(String),
    #[error("unsupported qop: {0}")]
    UnsupportedQop(String),
    #[error("opaque does not match")]
    OpaqueMismatch,
    #[error("unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("credentials lack a ':' separator")]
    MissingSeparator,
}

pub type Result<T> = result::Result<T, Error>;
