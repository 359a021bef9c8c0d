//! Courier Application - Use cases and ports
//!
//! This crate defines the application layer with:
//! - Port traits (interfaces for external dependencies)
//! - The `{{variable}}` template resolver
//! - The secret vault (cipher, session, secret lookup)
//! - The request orchestration use case
//! - Application-level error handling

pub mod error;
pub mod execute_request;
pub mod ports;
pub mod variable_resolver;
pub mod vault;

pub use error::{ApplicationError, ApplicationResult};
pub use execute_request::{ExecuteRequest, ExecuteRequestError, RequestRunResult};
pub use ports::{
    CancellationReceiver, CancellationToken, Clock, EnvironmentStore, EnvironmentStoreError,
    RequestExecutor, ScriptRunner, ScriptRunnerError, SecretLookup, SecretStore, SecretStoreError,
};
pub use variable_resolver::{ResolutionContext, ResolveError};
pub use vault::{CipherError, SecretVault, VaultError, VaultSession};
