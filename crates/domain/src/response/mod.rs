//! HTTP Response domain types

mod outcome;
mod spec;

pub use outcome::{ExecutionFailure, ExecutionOutcome, FailureKind};
pub use spec::{ResponseSpec, StatusCode};
