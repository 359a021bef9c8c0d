//! Executor outcome
//!
//! The transport never raises: every call ends in one of these two variants.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ResponseSpec;

/// Why a call produced no HTTP response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The request exceeded its timeout.
    Timeout,
    /// DNS, connect, TLS, or I/O failure.
    Network,
    /// The request could not be built (bad URL, bad header, ...).
    InvalidRequest,
    /// The run was cancelled while the call was in flight.
    Cancelled,
}

impl FailureKind {
    /// Status text reported on the synthesized status-0 response.
    #[must_use]
    pub const fn status_text(self) -> &'static str {
        match self {
            Self::Timeout => "Timeout",
            Self::Network | Self::InvalidRequest | Self::Cancelled => "Error",
        }
    }
}

/// A call that never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionFailure {
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
    /// Time spent before the failure.
    pub elapsed: Duration,
}

impl ExecutionFailure {
    /// Creates a failure.
    #[must_use]
    pub fn new(kind: FailureKind, message: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            kind,
            message: message.into(),
            elapsed,
        }
    }
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.status_text(), self.message)
    }
}

/// Result of handing a request to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// An HTTP response was received (any status).
    Completed(ResponseSpec),
    /// No HTTP response was obtained.
    Failed(ExecutionFailure),
}

impl ExecutionOutcome {
    /// Returns true for `Completed`.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Collapses the outcome into a response, status `0` for failures.
    #[must_use]
    pub fn into_response(self) -> ResponseSpec {
        match self {
            Self::Completed(response) => response,
            Self::Failed(failure) => {
                ResponseSpec::failed(failure.kind.status_text(), failure.message, failure.elapsed)
            }
        }
    }
}
