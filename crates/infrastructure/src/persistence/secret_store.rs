//! File-based secret store.
//!
//! Holds the vault's encrypted records and its key verification token.
//! Plaintext never reaches this file:
//! ```json
//! {
//!   "schema_version": 1,
//!   "verification_token": "c2FsdA==:aG1hYw==",
//!   "secrets": {
//!     "api_key": { "id": "0190...", "name": "api_key", "type": "api_key", "encrypted_value": "...", ... }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use courier_application::ports::{SecretStore, SecretStoreError};
use courier_domain::environment::Secret;

use crate::serialization::{SerializationError, read_json_file, write_json_file};

const SCHEMA_VERSION: u32 = 1;

const fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

#[derive(Debug, Serialize, Deserialize)]
struct VaultFile {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    verification_token: Option<String>,
    #[serde(default)]
    secrets: BTreeMap<String, Secret>,
}

impl Default for VaultFile {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            verification_token: None,
            secrets: BTreeMap::new(),
        }
    }
}

fn to_store_error(error: SerializationError) -> SecretStoreError {
    match error {
        SerializationError::Io(e) => SecretStoreError::Io(e),
        other => SecretStoreError::Serialization(other.to_string()),
    }
}

/// Secret store persisted as a single JSON file, keyed by secret name.
#[derive(Debug)]
pub struct FileSecretStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSecretStore {
    /// Creates a store over `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<VaultFile, SecretStoreError> {
        Ok(read_json_file(&self.path)
            .await
            .map_err(to_store_error)?
            .unwrap_or_default())
    }

    async fn store(&self, file: &VaultFile) -> Result<(), SecretStoreError> {
        write_json_file(&self.path, file).await.map_err(to_store_error)
    }

    /// Returns the stored key verification token, if the vault was ever
    /// initialised.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn verification_token(&self) -> Result<Option<String>, SecretStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.verification_token)
    }

    /// Replaces the key verification token.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub async fn set_verification_token(&self, token: &str) -> Result<(), SecretStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        file.verification_token = Some(token.to_string());
        self.store(&file).await
    }

    /// Lists secret names in sorted order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn names(&self) -> Result<Vec<String>, SecretStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.secrets.into_keys().collect())
    }

    /// Deletes a secret. Returns whether it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub async fn remove(&self, name: &str) -> Result<bool, SecretStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        if file.secrets.remove(name).is_none() {
            return Ok(false);
        }
        self.store(&file).await?;
        Ok(true)
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn get_by_name(&self, name: &str) -> Result<Option<Secret>, SecretStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.secrets.remove(name))
    }

    async fn save(&self, secret: &Secret) -> Result<(), SecretStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        file.secrets.insert(secret.name.clone(), secret.clone());
        self.store(&file).await
    }

    async fn touch(&self, name: &str, at: DateTime<Utc>) -> Result<(), SecretStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let secret = file
            .secrets
            .get_mut(name)
            .ok_or_else(|| SecretStoreError::NotFound(name.to_string()))?;
        secret.last_used_at = Some(at);
        self.store(&file).await
    }
}
