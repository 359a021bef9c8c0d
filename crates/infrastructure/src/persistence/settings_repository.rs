//! Execution settings persistence.
//!
//! By default settings live in the platform config directory:
//! - Linux: ~/.config/courier/settings.json
//! - macOS: ~/Library/Application Support/courier/settings.json
//! - Windows: %APPDATA%/courier/settings.json

use std::path::{Path, PathBuf};

use courier_domain::settings::ExecutionSettings;
use tracing::debug;

use crate::serialization::{SerializationError, read_json_file, write_json_file};

/// Error type for settings operations.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// Reading, parsing or writing the file failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    /// Could not determine config directory.
    #[error("Could not determine config directory")]
    NoConfigDir,
}

/// Loads and saves `ExecutionSettings` as stable JSON.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    path: PathBuf,
}

impl SettingsRepository {
    /// Creates a repository over an explicit file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a repository at `<config dir>/courier/settings.json`.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::NoConfigDir` if the platform has no config
    /// directory for the current user.
    pub fn in_config_dir() -> Result<Self, SettingsError> {
        dirs::config_dir()
            .map(|dir| Self::new(dir.join("courier").join("settings.json")))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Returns the settings file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads settings. A missing file yields the defaults; missing fields
    /// in an existing file take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<ExecutionSettings, SettingsError> {
        let settings: Option<ExecutionSettings> = read_json_file(&self.path).await?;
        if settings.is_none() {
            debug!(path = %self.path.display(), "no settings file, using defaults");
        }
        Ok(settings.unwrap_or_default())
    }

    /// Saves settings, creating the parent directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, settings: &ExecutionSettings) -> Result<(), SettingsError> {
        write_json_file(&self.path, settings).await?;
        Ok(())
    }
}
