use serde::Deserialize;

/// Realm used when none is configured
pub const DEFAULT_REALM: &str = "Users";

fn default_realm() -> String {
    DEFAULT_REALM.to_string()
}

/// Settings for a [`BasicVerifier`](crate::BasicVerifier)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BasicConfig {
    #[serde(default = "default_realm")]
    pub realm: String,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
        }
    }
}

impl BasicConfig {
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }
}

/// Settings for a [`DigestVerifier`](crate::DigestVerifier)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigestConfig {
    #[serde(default = "default_realm")]
    pub realm: String,
    /// Token clients must echo back; not checked when unset
    #[serde(default)]
    pub opaque: Option<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            opaque: None,
        }
    }
}

impl DigestConfig {
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    pub fn with_opaque(mut self, opaque: impl Into<String>) -> Self {
        self.opaque = Some(opaque.into());
        self
    }
}
