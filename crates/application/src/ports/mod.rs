//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod cancellation;
mod clock;
mod environment_store;
mod request_executor;
mod script_runner;
mod secret_lookup;
mod secret_store;

pub use cancellation::{CancellationReceiver, CancellationToken};
pub use clock::Clock;
pub use environment_store::{EnvironmentStore, EnvironmentStoreError};
pub use request_executor::RequestExecutor;
pub use script_runner::{ScriptRunner, ScriptRunnerError};
pub use secret_lookup::SecretLookup;
pub use secret_store::{SecretStore, SecretStoreError};
