//! Environment and variable domain types

mod resolution;
mod secret;
mod variable;

pub use resolution::{ResolutionPolicy, VariableScopes};
pub use secret::{Secret, SecretType};
pub use variable::{Environment, ResolvedVariable, VariableMap, VariableScope};
