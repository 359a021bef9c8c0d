//! Environments, variable maps and scope tags

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Flat name → value mapping. Sorted so serialization is deterministic.
pub type VariableMap = BTreeMap<String, String>;

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableScope {
    /// The active environment.
    Environment,
    /// Collection-level variables.
    Collection,
    /// Global variables.
    Global,
    /// The encrypted secret vault.
    Vault,
}

impl VariableScope {
    /// Lowercase tag used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Environment => "environment",
            Self::Collection => "collection",
            Self::Global => "global",
            Self::Vault => "vault",
        }
    }
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A variable value together with the scope that supplied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVariable {
    /// Variable name as referenced.
    pub name: String,
    /// Resolved value.
    pub value: String,
    /// Scope the value was taken from.
    pub scope: VariableScope,
}

/// A named set of variables. At most one environment is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Unique identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Variables, keyed by name.
    #[serde(default)]
    pub variables: VariableMap,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Environment {
    /// Creates an empty environment.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            variables: VariableMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Adds a variable (builder form).
    #[must_use]
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Returns a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Inserts or replaces a variable and bumps `updated_at`.
    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
        self.updated_at = Utc::now();
    }

    /// Removes a variable, returning its old value.
    pub fn remove_variable(&mut self, key: &str) -> Option<String> {
        let removed = self.variables.remove(key);
        if removed.is_some() {
            self.updated_at = Utc::now();
        }
        removed
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_variable_replaces_and_touches() {
        let mut env = Environment::new("dev").with_variable("host", "localhost");
        let before = env.updated_at;

        env.set_variable("host", "example.com");

        assert_eq!(env.get("host"), Some("example.com"));
        assert!(env.updated_at >= before);
    }

    #[test]
    fn variables_serialize_sorted() {
        let env = Environment::new("dev")
            .with_variable("zeta", "1")
            .with_variable("alpha", "2");

        let json = serde_json::to_string(&env.variables).unwrap();
        assert_eq!(json, r#"{"alpha":"2","zeta":"1"}"#);
    }

    #[test]
    fn remove_missing_variable_is_noop() {
        let mut env = Environment::new("dev");
        assert_eq!(env.remove_variable("nope"), None);
    }
}
