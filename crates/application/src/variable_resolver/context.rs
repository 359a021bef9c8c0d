//! Resolution context
//!
//! Holds all variable sources for resolution: the three plain scopes plus
//! an optional vault handle and whether it is unlocked.

use std::sync::Arc;

use courier_domain::environment::{ResolvedVariable, VariableMap, VariableScopes};

use super::parser::{ReferenceKind, TemplateReference};
use crate::ports::SecretLookup;

/// Everything a scope-aware resolution reads from.
#[derive(Clone, Default)]
pub struct ResolutionContext {
    /// Environment, collection and global variables.
    pub scopes: VariableScopes,

    /// Vault used for `{{vault:name}}` references.
    pub vault: Option<Arc<dyn SecretLookup>>,

    /// Whether vault references should be looked up at all.
    pub vault_unlocked: bool,
}

impl std::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("scopes", &self.scopes)
            .field("vault", &self.vault.is_some())
            .field("vault_unlocked", &self.vault_unlocked)
            .finish()
    }
}

impl ResolutionContext {
    /// Creates a context over the given scopes with no vault.
    #[must_use]
    pub fn new(scopes: VariableScopes) -> Self {
        Self {
            scopes,
            vault: None,
            vault_unlocked: false,
        }
    }

    /// Creates a context with only an environment scope.
    #[must_use]
    pub fn from_environment(environment: VariableMap) -> Self {
        Self::new(VariableScopes::new().with_environment(environment))
    }

    /// Attaches a vault, capturing its current lock state.
    #[must_use]
    pub fn with_vault(mut self, vault: Arc<dyn SecretLookup>) -> Self {
        self.vault_unlocked = vault.is_unlocked();
        self.vault = Some(vault);
        self
    }

    /// Returns the vault only when it may be queried.
    pub(crate) fn unlocked_vault(&self) -> Option<&Arc<dyn SecretLookup>> {
        self.vault.as_ref().filter(|_| self.vault_unlocked)
    }

    /// Resolves a non-vault reference through the scopes.
    #[must_use]
    pub fn resolve_scoped(&self, reference: &TemplateReference) -> Option<ResolvedVariable> {
        use courier_domain::environment::VariableScope;

        match reference.kind {
            ReferenceKind::Bare => self.scopes.resolve(&reference.name),
            ReferenceKind::Global => self.scopes.resolve_in(VariableScope::Global, &reference.name),
            ReferenceKind::Collection => self
                .scopes
                .resolve_in(VariableScope::Collection, &reference.name),
            ReferenceKind::Vault => None,
        }
    }
}
