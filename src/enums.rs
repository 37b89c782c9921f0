use crate::{Error, Error::*, Result};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use digest::{Digest, DynDigest};
use md5::Md5;
use sha2::Sha256;

/// Hash algorithm named in the `algorithm` parameter
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[allow(non_camel_case_types)]
pub enum Algorithm {
    #[default]
    MD5,
    SHA2_256,
}

impl Algorithm {
    /// Calculate a lowercase hex hash of bytes using the selected algorithm
    pub fn hash(self, bytes: &[u8]) -> String {
        let mut hash: Box<dyn DynDigest> = match self {
            Algorithm::MD5 => Box::new(Md5::new()),
            Algorithm::SHA2_256 => Box::new(Sha256::new()),
        };

        hash.update(bytes);
        hex::encode(hash.finalize())
    }

    /// Calculate a hash of string's bytes using the selected algorithm
    pub fn hash_str(self, bytes: &str) -> String {
        self.hash(bytes.as_bytes())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    /// Parse from the format used in WWW-Authenticate
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "MD5" => Ok(Algorithm::MD5),
            "SHA-256" => Ok(Algorithm::SHA2_256),
            _ => Err(UnsupportedAlgorithm(s.into())),
        }
    }
}

impl Display for Algorithm {
    /// Format to the form used in HTTP headers
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Algorithm::MD5 => "MD5",
            Algorithm::SHA2_256 => "SHA-256",
        })
    }
}

/// QOP field values
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[allow(non_camel_case_types)]
pub enum Qop {
    #[default]
    AUTH,
    AUTH_INT,
}

impl FromStr for Qop {
    type Err = Error;

    /// Parse from "auth" or "auth-int" as used in HTTP headers
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auth" => Ok(Qop::AUTH),
            "auth-int" => Ok(Qop::AUTH_INT),
            _ => Err(UnsupportedQop(s.into())),
        }
    }
}

impl Display for Qop {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Qop::AUTH => "auth",
            Qop::AUTH_INT => "auth-int",
        })
    }
}

/// HTTP method (part of the HA2 input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HttpMethod<'a> {
    #[default]
    GET,
    POST,
    HEAD,
    OTHER(&'a str),
}

impl<'a> From<&'a str> for HttpMethod<'a> {
    fn from(s: &'a str) -> Self {
        match s {
            "GET" => HttpMethod::GET,
            "POST" => HttpMethod::POST,
            "HEAD" => HttpMethod::HEAD,
            other => HttpMethod::OTHER(other),
        }
    }
}

impl<'a> Display for HttpMethod<'a> {
    /// Convert to uppercase string
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OTHER(s) => s,
        })
    }
}
