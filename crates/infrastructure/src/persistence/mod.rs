//! File-backed persistence adapters.
//!
//! Every store keeps its whole state in one JSON file and serialises
//! access through an async mutex, so a read-modify-write never interleaves
//! with another one in the same process.

mod environment_store;
mod secret_store;
mod settings_repository;

pub use environment_store::FileEnvironmentStore;
pub use secret_store::FileSecretStore;
pub use settings_repository::{SettingsError, SettingsRepository};
