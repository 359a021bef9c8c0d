//! Template resolution module
//!
//! Provides parsing and resolution of `{{variable}}` syntax in strings and
//! whole requests.
//!
//! | syntax | looks up |
//! |---|---|
//! | `{{name}}` | environment → collection → global |
//! | `{{$global.name}}` | global only |
//! | `{{$collection.name}}` | collection only |
//! | `{{vault:name}}` | the secret vault, when unlocked |
//!
//! # Usage
//!
//! ```
//! use courier_application::variable_resolver::resolve;
//! use courier_domain::environment::{ResolutionPolicy, VariableMap};
//!
//! let mut env = VariableMap::new();
//! env.insert("host".to_string(), "localhost".to_string());
//!
//! let url = resolve("http://{{host}}/api", &env, ResolutionPolicy::LeaveAsIs).unwrap();
//! assert_eq!(url, "http://localhost/api");
//! ```

mod context;
pub mod engine;
pub mod parser;
mod request;

pub use context::ResolutionContext;
pub use engine::{ResolveError, extract_references, find_unresolved, resolve, resolve_async};
pub use parser::{ReferenceKind, TemplateReference, has_variables, parse_references};
pub use request::{resolve_request, resolve_request_async};
