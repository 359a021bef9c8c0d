//! Environment store port
//!
//! Reads the active environment and writes single variables back to it.

use async_trait::async_trait;

use courier_domain::environment::Environment;

use super::CancellationReceiver;

/// Errors that can occur during environment store operations.
#[derive(Debug, thiserror::Error)]
pub enum EnvironmentStoreError {
    /// A write was attempted with no active environment.
    #[error("no active environment")]
    NoActiveEnvironment,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The operation was cancelled.
    #[error("operation cancelled")]
    Cancelled,
}

/// Store holding the currently active environment.
#[async_trait]
pub trait EnvironmentStore: Send + Sync {
    /// Returns the active environment, if any.
    ///
    /// # Errors
    /// Returns an error if the backing storage cannot be read.
    async fn get_active(
        &self,
        cancel: &CancellationReceiver,
    ) -> Result<Option<Environment>, EnvironmentStoreError>;

    /// Sets one variable on the active environment.
    ///
    /// # Errors
    /// Returns `EnvironmentStoreError::NoActiveEnvironment` when nothing is
    /// active, or an I/O error if the write fails.
    async fn set_variable(
        &self,
        key: &str,
        value: &str,
        cancel: &CancellationReceiver,
    ) -> Result<(), EnvironmentStoreError>;
}
