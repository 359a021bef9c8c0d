//! Query parameter types

use serde::{Deserialize, Serialize};

/// A query parameter key-value pair.
///
/// Supports enable/disable without deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    /// The parameter key
    pub key: String,
    /// The parameter value
    pub value: String,
    /// Whether this parameter is enabled
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl QueryParam {
    /// Creates a new enabled query parameter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }

    /// Creates a disabled query parameter.
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
