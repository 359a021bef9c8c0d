//! Application error types

use thiserror::Error;

use courier_domain::DomainError;

use crate::execute_request::ExecuteRequestError;
use crate::variable_resolver::ResolveError;
use crate::vault::{CipherError, VaultError};

/// Application-level errors.
///
/// Umbrella over the per-concern errors for callers that do not care which
/// component failed.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A domain validation error occurred.
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// A request run failed.
    #[error(transparent)]
    Execute(#[from] ExecuteRequestError),

    /// Template resolution failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// A cipher operation failed.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// A vault operation failed.
    #[error(transparent)]
    Vault(#[from] VaultError),
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
