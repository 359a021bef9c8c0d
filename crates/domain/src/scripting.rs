//! Pre-request and post-response scripting.
//!
//! This module provides the types exchanged with a script runner: the
//! context a script sees, the commands of the built-in DSL and the result
//! a run reports back.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::environment::VariableMap;
use crate::request::RequestSpec;
use crate::response::ResponseSpec;

/// Which side of the HTTP call a script runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptPhase {
    /// Before the request is resolved and sent.
    PreRequest,
    /// After the response (or failure) is known.
    PostResponse,
}

impl ScriptPhase {
    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreRequest => "pre_request",
            Self::PostResponse => "post_response",
        }
    }
}

impl fmt::Display for ScriptPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a script may read while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContext {
    /// Phase tag.
    pub phase: ScriptPhase,
    /// The in-flight request. Resolved in the post-response phase.
    pub request: RequestSpec,
    /// The response; absent in the pre-request phase.
    pub response: Option<ResponseSpec>,
    /// Snapshot of the active environment.
    pub environment: VariableMap,
}

impl ScriptContext {
    /// Builds a pre-request context.
    #[must_use]
    pub const fn pre_request(request: RequestSpec, environment: VariableMap) -> Self {
        Self {
            phase: ScriptPhase::PreRequest,
            request,
            response: None,
            environment,
        }
    }

    /// Builds a post-response context.
    #[must_use]
    pub const fn post_response(
        request: RequestSpec,
        response: ResponseSpec,
        environment: VariableMap,
    ) -> Self {
        Self {
            phase: ScriptPhase::PostResponse,
            request,
            response: Some(response),
            environment,
        }
    }
}

/// A command of the built-in line DSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Set an environment variable: set("name", "value")
    SetVariable {
        /// Variable name.
        name: String,
        /// Variable value.
        value: String,
    },
    /// Log a message: log("message")
    Log {
        /// The message to log.
        message: String,
    },
    /// Record a named test: test("name", condition)
    Test {
        /// Test name.
        name: String,
        /// The condition expression.
        condition: String,
    },
    /// Assert a condition: assert(condition, message)
    Assert {
        /// The condition expression.
        condition: String,
        /// Optional message if assertion fails.
        message: Option<String>,
    },
    /// Delay execution: delay(ms)
    Delay {
        /// Delay in milliseconds.
        millis: u64,
    },
}

/// Outcome of a single named test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test name.
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TestResult {
    /// A passing test.
    #[must_use]
    pub fn passed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            error: None,
        }
    }

    /// A failing test.
    #[must_use]
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            error: Some(error.into()),
        }
    }
}

/// Result of script execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptResult {
    /// Whether execution was successful.
    pub success: bool,
    /// Log messages generated, in order.
    #[serde(default)]
    pub logs: Vec<String>,
    /// Error messages, in order.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Test results, in order.
    #[serde(default)]
    pub test_results: Vec<TestResult>,
    /// Environment variables the script wants written back.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_updates: Option<BTreeMap<String, String>>,
}

impl Default for ScriptResult {
    fn default() -> Self {
        Self {
            success: true,
            logs: Vec::new(),
            errors: Vec::new(),
            test_results: Vec::new(),
            environment_updates: None,
        }
    }
}

impl ScriptResult {
    /// Create a successful empty result.
    #[must_use]
    pub fn success() -> Self {
        Self::default()
    }

    /// Create a failed result with an error message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![message.into()],
            ..Default::default()
        }
    }

    /// Add a log message.
    pub fn add_log(&mut self, message: impl Into<String>) {
        self.logs.push(message.into());
    }

    /// Record an error and mark the run failed.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.success = false;
        self.errors.push(message.into());
    }

    /// Record a test result.
    pub fn add_test_result(&mut self, result: TestResult) {
        self.test_results.push(result);
    }

    /// Queue an environment update. Later writes to the same key win.
    pub fn set_variable(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.environment_updates
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
    }

    /// Returns true if any recorded test failed.
    #[must_use]
    pub fn has_failed_tests(&self) -> bool {
        self.test_results.iter().any(|t| !t.passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_error_marks_failure() {
        let mut result = ScriptResult::success();
        assert!(result.success);

        result.add_error("boom");

        assert!(!result.success);
        assert_eq!(result.errors, vec!["boom".to_string()]);
    }

    #[test]
    fn set_variable_creates_updates_lazily() {
        let mut result = ScriptResult::success();
        assert!(result.environment_updates.is_none());

        result.set_variable("token", "a");
        result.set_variable("token", "b");

        let updates = result.environment_updates.unwrap_or_default();
        assert_eq!(updates.get("token").map(String::as_str), Some("b"));
    }

    #[test]
    fn failed_tests_do_not_flip_success() {
        let mut result = ScriptResult::success();
        result.add_test_result(TestResult::failed("status is 200", "got 500"));

        assert!(result.success);
        assert!(result.has_failed_tests());
    }

    #[test]
    fn pre_request_context_has_no_response() {
        let ctx = ScriptContext::pre_request(RequestSpec::default(), VariableMap::new());
        assert_eq!(ctx.phase, ScriptPhase::PreRequest);
        assert!(ctx.response.is_none());
    }
}
