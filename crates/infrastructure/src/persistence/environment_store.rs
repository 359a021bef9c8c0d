//! File-based environment store.
//!
//! Layout of the backing file:
//! ```json
//! {
//!   "active": "0190...",
//!   "environments": [
//!     { "id": "0190...", "name": "dev", "variables": { "base_url": "http://localhost" }, ... }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use courier_application::ports::{CancellationReceiver, EnvironmentStore, EnvironmentStoreError};
use courier_domain::environment::Environment;

use crate::serialization::{SerializationError, read_json_file, write_json_file};

#[derive(Debug, Default, Serialize, Deserialize)]
struct EnvironmentFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    active: Option<Uuid>,
    #[serde(default)]
    environments: Vec<Environment>,
}

impl EnvironmentFile {
    fn active(&self) -> Option<&Environment> {
        let id = self.active?;
        self.environments.iter().find(|e| e.id == id)
    }

    fn active_mut(&mut self) -> Option<&mut Environment> {
        let id = self.active?;
        self.environments.iter_mut().find(|e| e.id == id)
    }
}

fn to_store_error(error: SerializationError) -> EnvironmentStoreError {
    match error {
        SerializationError::Io(e) => EnvironmentStoreError::Io(e),
        other => EnvironmentStoreError::Serialization(other.to_string()),
    }
}

/// Environment store persisted as a single JSON file.
#[derive(Debug)]
pub struct FileEnvironmentStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileEnvironmentStore {
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

    async fn load(&self) -> Result<EnvironmentFile, EnvironmentStoreError> {
        Ok(read_json_file(&self.path)
            .await
            .map_err(to_store_error)?
            .unwrap_or_default())
    }

    async fn store(&self, file: &EnvironmentFile) -> Result<(), EnvironmentStoreError> {
        write_json_file(&self.path, file).await.map_err(to_store_error)
    }

    /// Lists all environments in file order.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn list(&self) -> Result<Vec<Environment>, EnvironmentStoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.environments)
    }

    /// Inserts an environment, or replaces the one with the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub async fn save(&self, environment: &Environment) -> Result<(), EnvironmentStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;

        match file.environments.iter_mut().find(|e| e.id == environment.id) {
            Some(existing) => *existing = environment.clone(),
            None => file.environments.push(environment.clone()),
        }

        self.store(&file).await
    }

    /// Marks an environment active. Returns `false` if no environment has
    /// that id, leaving the current selection untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub async fn activate(&self, id: Uuid) -> Result<bool, EnvironmentStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;

        if !file.environments.iter().any(|e| e.id == id) {
            return Ok(false);
        }

        file.active = Some(id);
        self.store(&file).await?;
        debug!(environment = %id, "environment activated");
        Ok(true)
    }

    /// Clears the active selection.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or written.
    pub async fn deactivate(&self) -> Result<(), EnvironmentStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        file.active = None;
        self.store(&file).await
    }
}

#[async_trait]
impl EnvironmentStore for FileEnvironmentStore {
    async fn get_active(
        &self,
        cancel: &CancellationReceiver,
    ) -> Result<Option<Environment>, EnvironmentStoreError> {
        if cancel.is_cancelled() {
            return Err(EnvironmentStoreError::Cancelled);
        }

        let _guard = self.lock.lock().await;
        let file = self.load().await?;
        Ok(file.active().cloned())
    }

    async fn set_variable(
        &self,
        key: &str,
        value: &str,
        cancel: &CancellationReceiver,
    ) -> Result<(), EnvironmentStoreError> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;

        let environment = file
            .active_mut()
            .ok_or(EnvironmentStoreError::NoActiveEnvironment)?;
        environment.set_variable(key, value);

        if cancel.is_cancelled() {
            return Err(EnvironmentStoreError::Cancelled);
        }

        self.store(&file).await?;
        debug!(variable = %key, "environment variable written");
        Ok(())
    }
}
