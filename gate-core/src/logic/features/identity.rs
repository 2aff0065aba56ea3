//! Client identity key

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque caller key (usually the source address).
///
/// Compared by exact string match; no normalization is applied, so
/// `"1.2.3.4"` and `" 1.2.3.4"` are two different clients.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientIdentity(String);

impl ClientIdentity {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientIdentity {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ClientIdentity {
    fn from(key: String) -> Self {
        Self(key)
    }
}
