//! Layered variable scopes and miss policies
//!
//! Bare names resolve in order of precedence (highest wins):
//! 1. Environment
//! 2. Collection
//! 3. Global
//!
//! The same name may live in several scopes; precedence picks one, it is
//! never an error.

use serde::{Deserialize, Serialize};

use super::variable::{ResolvedVariable, VariableMap, VariableScope};

/// What to do when a reference cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPolicy {
    /// Keep the `{{...}}` text verbatim.
    #[default]
    LeaveAsIs,
    /// Substitute an empty string.
    ReplaceWithEmpty,
    /// Fail, naming the variable.
    ThrowError,
}

/// The three plain-text variable scopes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableScopes {
    /// Active environment variables.
    pub environment: VariableMap,
    /// Collection-level variables.
    pub collection: VariableMap,
    /// Global variables.
    pub global: VariableMap,
}

impl VariableScopes {
    /// Creates empty scopes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environment scope.
    #[must_use]
    pub fn with_environment(mut self, environment: VariableMap) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the collection scope.
    #[must_use]
    pub fn with_collection(mut self, collection: VariableMap) -> Self {
        self.collection = collection;
        self
    }

    /// Sets the global scope.
    #[must_use]
    pub fn with_global(mut self, global: VariableMap) -> Self {
        self.global = global;
        self
    }

    /// Resolves a bare name through environment → collection → global.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<ResolvedVariable> {
        [
            VariableScope::Environment,
            VariableScope::Collection,
            VariableScope::Global,
        ]
        .into_iter()
        .find_map(|scope| self.resolve_in(scope, name))
    }

    /// Resolves a name in one scope only. The vault scope never matches here.
    #[must_use]
    pub fn resolve_in(&self, scope: VariableScope, name: &str) -> Option<ResolvedVariable> {
        let map = match scope {
            VariableScope::Environment => &self.environment,
            VariableScope::Collection => &self.collection,
            VariableScope::Global => &self.global,
            VariableScope::Vault => return None,
        };

        map.get(name).map(|value| ResolvedVariable {
            name: name.to_string(),
            value: value.clone(),
            scope,
        })
    }

    /// Returns all variable names across the three scopes, sorted and deduplicated.
    #[must_use]
    pub fn all_variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .global
            .keys()
            .chain(self.collection.keys())
            .chain(self.environment.keys())
            .cloned()
            .collect();

        names.sort();
        names.dedup();
        names
    }
}
