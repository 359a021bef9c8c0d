//! Courier Domain - Core business types
//!
//! This crate defines the data model of the request execution core:
//! requests, responses, environments, secrets, scripts and settings.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod environment;
pub mod error;
pub mod request;
pub mod response;
pub mod scripting;
pub mod settings;

pub use auth::{ApiKeyLocation, AuthConfig, AuthResolution};
pub use environment::{
    Environment, ResolutionPolicy, ResolvedVariable, Secret, SecretType, VariableMap,
    VariableScope, VariableScopes,
};
pub use error::{DomainError, DomainResult};
pub use request::{FormField, Header, HttpMethod, QueryParam, RequestBody, RequestSpec};
pub use response::{ExecutionFailure, ExecutionOutcome, FailureKind, ResponseSpec, StatusCode};
pub use scripting::{ScriptCommand, ScriptContext, ScriptPhase, ScriptResult, TestResult};
pub use settings::{ExecutionSettings, LogSettings};
