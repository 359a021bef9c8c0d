//! Secret store port
//!
//! Persists encrypted `Secret` records. Never sees plaintext.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use courier_domain::environment::Secret;

/// Errors that can occur during secret store operations.
#[derive(Debug, thiserror::Error)]
pub enum SecretStoreError {
    /// Secret not found.
    #[error("secret not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository trait for encrypted secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Loads a secret by its unique name.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be read.
    async fn get_by_name(&self, name: &str) -> Result<Option<Secret>, SecretStoreError>;

    /// Inserts or replaces a secret, keyed by name.
    ///
    /// # Errors
    /// Returns an error if the storage cannot be written.
    async fn save(&self, secret: &Secret) -> Result<(), SecretStoreError>;

    /// Records that a secret was used at `at`.
    ///
    /// # Errors
    /// Returns `SecretStoreError::NotFound` if no secret has that name.
    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<(), SecretStoreError>;
}
