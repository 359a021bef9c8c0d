//! HTTP Header types

use serde::{Deserialize, Serialize};

/// A single request header. Order within a request is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub key: String,
    /// The header value (e.g., "application/json")
    pub value: String,
    /// Whether this header is sent
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl Header {
    /// Creates a new enabled header.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a new disabled header.
    #[must_use]
    pub fn disabled(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            enabled: false,
            ..Self::new(key, value)
        }
    }

    /// Returns a copy with key and value replaced, keeping the enabled flag.
    #[must_use]
    pub fn with_parts(&self, key: String, value: String) -> Self {
        Self {
            key,
            value,
            enabled: self.enabled,
        }
    }
}
