//! Execution Settings Domain Model
//!
//! Tunables for a request run plus the logging setup.

use serde::{Deserialize, Serialize};

use crate::environment::ResolutionPolicy;

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Settings that shape one request run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSettings {
    /// What to do with unresolved template references.
    #[serde(default)]
    pub unresolved_policy: ResolutionPolicy,

    /// Re-read the environment after the post-response writes.
    #[serde(default)]
    pub refresh_after_post_response: bool,

    /// Upper bound for a single script run.
    #[serde(default = "default_script_timeout_ms")]
    pub script_timeout_ms: u64,

    /// Request timeout when the request does not carry its own.
    #[serde(default = "default_request_timeout_ms")]
    pub default_request_timeout_ms: u64,

    /// Logging setup.
    #[serde(default)]
    pub log: LogSettings,
}

const fn default_script_timeout_ms() -> u64 {
    5_000
}

const fn default_request_timeout_ms() -> u64 {
    30_000
}

impl Default for ExecutionSettings {
    fn default() -> Self {
        Self {
            unresolved_policy: ResolutionPolicy::default(),
            refresh_after_post_response: false,
            script_timeout_ms: default_script_timeout_ms(),
            default_request_timeout_ms: default_request_timeout_ms(),
            log: LogSettings::default(),
        }
    }
}
