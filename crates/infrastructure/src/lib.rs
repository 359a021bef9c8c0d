//! Courier Infrastructure - Adapters and implementations
//!
//! Concrete implementations of the ports defined in the application
//! layer: a reqwest executor, JSON file stores, the DSL script runner,
//! settings persistence and the logging bootstrap.

pub mod adapters;
pub mod http;
pub mod logging;
pub mod persistence;
pub mod scripting;
pub mod serialization;

pub use adapters::{ReqwestExecutor, SystemClock};
pub use http::{BodyBuildError, BuiltBody, build_body};
pub use logging::{LoggingError, init_logging};
pub use persistence::{FileEnvironmentStore, FileSecretStore, SettingsError, SettingsRepository};
pub use scripting::{DslScriptRunner, Evaluator, ParseError, parse_script};
pub use serialization::{
    SerializationError, from_json_bytes, read_json_file, to_json_stable_bytes, write_json_file,
};
