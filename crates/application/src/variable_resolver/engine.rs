//! Template resolution engine
//!
//! Resolves `{{variable}}` references in a single forward scan: the output
//! is built from the original input, reference by reference, so substituted
//! values are never scanned again.

use courier_domain::environment::{ResolutionPolicy, VariableMap};
use thiserror::Error;

use super::context::ResolutionContext;
use super::parser::{ReferenceKind, TemplateReference, parse_references};

/// Errors raised by template resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A reference had no value and the policy is `ThrowError`.
    #[error("unresolved variable: {name}")]
    Unresolved {
        /// The reference text between the braces.
        name: String,
    },
}

/// What to put in place of one reference.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Substitution {
    /// A resolved value.
    Value(String),
    /// Nothing found; the policy decides.
    Miss,
    /// Left verbatim regardless of policy.
    Keep,
}

/// Builds the output for `input` given one substitution per reference.
///
/// Under `ThrowError` a vault miss is reported ahead of any scope miss.
fn render(
    input: &str,
    references: &[TemplateReference],
    substitutions: Vec<Substitution>,
    policy: ResolutionPolicy,
) -> Result<String, ResolveError> {
    if policy == ResolutionPolicy::ThrowError {
        let vault_miss = references
            .iter()
            .zip(&substitutions)
            .find(|(reference, substitution)| {
                reference.kind == ReferenceKind::Vault && **substitution == Substitution::Miss
            });
        if let Some((reference, _)) = vault_miss {
            return Err(ResolveError::Unresolved {
                name: reference.raw.clone(),
            });
        }
    }

    let mut result = String::with_capacity(input.len());
    let mut last_end = 0;

    for (reference, substitution) in references.iter().zip(substitutions) {
        // Append text before this reference
        result.push_str(&input[last_end..reference.span.start]);

        match substitution {
            Substitution::Value(value) => result.push_str(&value),
            Substitution::Keep => result.push_str(&input[reference.span.clone()]),
            Substitution::Miss => match policy {
                ResolutionPolicy::LeaveAsIs => result.push_str(&input[reference.span.clone()]),
                ResolutionPolicy::ReplaceWithEmpty => {}
                ResolutionPolicy::ThrowError => {
                    return Err(ResolveError::Unresolved {
                        name: reference.raw.clone(),
                    });
                }
            },
        }

        last_end = reference.span.end;
    }

    // Append remaining text after last reference
    result.push_str(&input[last_end..]);
    Ok(result)
}

/// Resolves every reference against one flat map, keyed by the full text
/// between the braces.
///
/// # Errors
/// Returns `ResolveError::Unresolved` for the first miss under
/// `ResolutionPolicy::ThrowError`.
///
/// # Examples
///
/// ```
/// use courier_application::variable_resolver::resolve;
/// use courier_domain::environment::{ResolutionPolicy, VariableMap};
///
/// let mut vars = VariableMap::new();
/// vars.insert("host".to_string(), "localhost".to_string());
///
/// let url = resolve("http://{{host}}/{{path}}", &vars, ResolutionPolicy::LeaveAsIs).unwrap();
/// assert_eq!(url, "http://localhost/{{path}}");
/// ```
pub fn resolve(
    input: &str,
    variables: &VariableMap,
    policy: ResolutionPolicy,
) -> Result<String, ResolveError> {
    let references = parse_references(input);
    if references.is_empty() {
        return Ok(input.to_string());
    }

    let substitutions = references
        .iter()
        .map(|reference| {
            variables
                .get(&reference.raw)
                .map_or(Substitution::Miss, |value| Substitution::Value(value.clone()))
        })
        .collect();

    render(input, &references, substitutions, policy)
}

/// Resolves scoped, bare and vault references against a context.
///
/// Vault references are left untouched while the vault is locked, whatever
/// the policy.
///
/// # Errors
/// Returns `ResolveError::Unresolved` under `ResolutionPolicy::ThrowError`,
/// naming the first vault miss if there is one, otherwise the first miss.
pub async fn resolve_async(
    input: &str,
    context: &ResolutionContext,
    policy: ResolutionPolicy,
) -> Result<String, ResolveError> {
    let references = parse_references(input);
    if references.is_empty() {
        return Ok(input.to_string());
    }

    let mut substitutions = Vec::with_capacity(references.len());
    for reference in &references {
        substitutions.push(lookup(reference, context).await);
    }

    render(input, &references, substitutions, policy)
}

async fn lookup(reference: &TemplateReference, context: &ResolutionContext) -> Substitution {
    if reference.kind == ReferenceKind::Vault {
        let Some(vault) = context.unlocked_vault() else {
            return Substitution::Keep;
        };
        return vault
            .get_secret_value(&reference.name)
            .await
            .map_or(Substitution::Miss, Substitution::Value);
    }

    context
        .resolve_scoped(reference)
        .map_or(Substitution::Miss, |resolved| Substitution::Value(resolved.value))
}

/// Lists the references in `input` that would miss against `context`.
/// Vault references are only checked while the vault is unlocked.
/// Useful for validation before sending a request.
pub async fn find_unresolved(input: &str, context: &ResolutionContext) -> Vec<String> {
    let mut unresolved = Vec::new();
    for reference in parse_references(input) {
        if lookup(&reference, context).await == Substitution::Miss {
            unresolved.push(reference.raw);
        }
    }
    unresolved
}

/// Extracts all references from the input without resolving them.
#[must_use]
pub fn extract_references(input: &str) -> Vec<TemplateReference> {
    parse_references(input)
}
