//! Script runner port

use async_trait::async_trait;

use courier_domain::scripting::{ScriptContext, ScriptResult};

use super::CancellationReceiver;

/// Engine-level failures. A script that merely fails reports
/// `success = false` in its `ScriptResult` instead.
#[derive(Debug, thiserror::Error)]
pub enum ScriptRunnerError {
    /// The engine itself broke.
    #[error("script engine error: {0}")]
    Engine(String),

    /// The script exceeded its time budget.
    #[error("script timed out after {0}ms")]
    Timeout(u64),

    /// The run was cancelled.
    #[error("script cancelled")]
    Cancelled,
}

/// Runs user scripts around an HTTP call.
#[async_trait]
pub trait ScriptRunner: Send + Sync {
    /// Runs a pre-request script.
    ///
    /// # Errors
    /// Returns an error only when the engine fails.
    async fn run_pre_request(
        &self,
        script: &str,
        context: &ScriptContext,
        cancel: &CancellationReceiver,
    ) -> Result<ScriptResult, ScriptRunnerError>;

    /// Runs a post-response script.
    ///
    /// # Errors
    /// Returns an error only when the engine fails.
    async fn run_post_response(
        &self,
        script: &str,
        context: &ScriptContext,
        cancel: &CancellationReceiver,
    ) -> Result<ScriptResult, ScriptRunnerError>;
}
