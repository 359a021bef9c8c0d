//! HTTP infrastructure utilities.
//!
//! Turns a resolved `RequestBody` into something reqwest can send.

mod body_builder;

pub use body_builder::{BodyBuildError, BuiltBody, build_body};
