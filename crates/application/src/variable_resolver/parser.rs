//! Template parser for `{{variable}}` syntax
//!
//! Parses strings to extract references with their positions. A reference
//! is `{{` followed by one or more characters other than `{` and `}`,
//! followed by `}}`. The text between the braces is trimmed; an empty name
//! is not a reference and stays as literal text.

use std::ops::Range;

const VAULT_PREFIX: &str = "vault:";
const GLOBAL_PREFIX: &str = "$global.";
const COLLECTION_PREFIX: &str = "$collection.";

/// How a reference picks its scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// `{{name}}`: environment → collection → global.
    Bare,
    /// `{{$global.name}}`: global scope only.
    Global,
    /// `{{$collection.name}}`: collection scope only.
    Collection,
    /// `{{vault:name}}`: a vault secret.
    Vault,
}

/// Represents a parsed reference in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateReference {
    /// The trimmed text between the braces, prefix included.
    pub raw: String,

    /// The variable name with any scope prefix stripped.
    pub name: String,

    /// Scope selector.
    pub kind: ReferenceKind,

    /// Byte range in the original string where this reference appears.
    pub span: Range<usize>,
}

impl TemplateReference {
    /// Classifies a trimmed inner text. Returns `None` when no name remains.
    #[must_use]
    pub fn new(raw: &str, span: Range<usize>) -> Option<Self> {
        let (kind, name) = if let Some(rest) = raw.strip_prefix(VAULT_PREFIX) {
            (ReferenceKind::Vault, rest.trim())
        } else if let Some(rest) = raw.strip_prefix(GLOBAL_PREFIX) {
            (ReferenceKind::Global, rest)
        } else if let Some(rest) = raw.strip_prefix(COLLECTION_PREFIX) {
            (ReferenceKind::Collection, rest)
        } else {
            (ReferenceKind::Bare, raw)
        };

        if name.is_empty() {
            return None;
        }

        Some(Self {
            raw: raw.to_string(),
            name: name.to_string(),
            kind,
            span,
        })
    }
}

/// Parses a string and extracts all references, left to right and
/// non-overlapping.
///
/// # Examples
///
/// ```
/// use courier_application::variable_resolver::parser::{ReferenceKind, parse_references};
///
/// let refs = parse_references("{{host}}/{{$global.version}}?k={{vault:api_key}}");
/// assert_eq!(refs.len(), 3);
/// assert_eq!(refs[1].name, "version");
/// assert_eq!(refs[1].kind, ReferenceKind::Global);
/// assert_eq!(refs[2].kind, ReferenceKind::Vault);
/// ```
#[must_use]
pub fn parse_references(input: &str) -> Vec<TemplateReference> {
    let bytes = input.as_bytes();
    let mut references = Vec::new();
    let mut pos = 0;

    while let Some(offset) = input[pos..].find("{{") {
        let start = pos + offset;
        match closing_braces(bytes, start + 2) {
            Some(end) => {
                let inner = input[start + 2..end - 2].trim();
                if let Some(reference) = TemplateReference::new(inner, start..end) {
                    references.push(reference);
                }
                pos = end;
            }
            // No match at this position; the next `{` may still open one.
            None => pos = start + 1,
        }
    }

    references
}

/// Scans a reference body starting at `from`. Returns the index just past
/// the closing `}}`, or `None` if the body is empty or hits a brace first.
fn closing_braces(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'{' => return None,
            b'}' => {
                return (i > from && bytes.get(i + 1) == Some(&b'}')).then_some(i + 2);
            }
            _ => i += 1,
        }
    }
    None
}

/// Returns true if the input string contains any references.
#[must_use]
pub fn has_variables(input: &str) -> bool {
    !parse_references(input).is_empty()
}

/// Extracts just the raw reference texts from the input.
#[must_use]
pub fn extract_variable_names(input: &str) -> Vec<String> {
    parse_references(input).into_iter().map(|r| r.raw).collect()
}
