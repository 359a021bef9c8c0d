//! Logging bootstrap.

use std::io;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use courier_domain::settings::LogSettings;

/// Error type for logging setup.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The configured level is not a valid filter directive.
    #[error("invalid log filter '{directive}': {message}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        message: String,
    },

    /// A global subscriber is already installed.
    #[error("logging already initialised: {0}")]
    AlreadyInitialised(String),
}

/// Builds the filter: `RUST_LOG` when set and valid, else `settings.level`.
///
/// # Errors
///
/// Returns `LoggingError::InvalidFilter` if the fallback level does not parse.
pub fn build_filter(settings: &LogSettings) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    EnvFilter::try_new(&settings.level).map_err(|e| LoggingError::InvalidFilter {
        directive: settings.level.clone(),
        message: e.to_string(),
    })
}

/// Installs the global subscriber: an env filter plus a stderr fmt layer,
/// plain or JSON lines.
///
/// # Errors
///
/// Returns an error if the level is invalid or a subscriber already exists.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    let filter = build_filter(settings)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if settings.json {
        registry
            .with(fmt::layer().with_writer(io::stderr).json())
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .try_init()
    };

    installed.map_err(|e| LoggingError::AlreadyInitialised(e.to_string()))
}
