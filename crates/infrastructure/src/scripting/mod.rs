//! Built-in script runner.
//!
//! A small line DSL for pre-request and post-response hooks: set
//! environment variables, log, record tests and assert on the response.

mod evaluator;
mod parser;
mod runner;

pub use evaluator::Evaluator;
pub use parser::{ParseError, parse_script};
pub use runner::DslScriptRunner;
