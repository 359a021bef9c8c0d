//! `ScriptRunner` adapter for the built-in DSL.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use courier_application::ports::{CancellationReceiver, ScriptRunner, ScriptRunnerError};
use courier_domain::scripting::{ScriptCommand, ScriptContext, ScriptResult, TestResult};
use courier_domain::settings::ExecutionSettings;

use super::evaluator::Evaluator;
use super::parser::parse_script;

/// Runs DSL scripts with a per-run time budget.
///
/// A script that does not parse, or whose `assert` fails, comes back as a
/// `ScriptResult` with `success = false`. Only running out of time and
/// cancellation are reported as errors.
#[derive(Debug, Clone, Copy)]
pub struct DslScriptRunner {
    timeout: Duration,
}

impl DslScriptRunner {
    /// Creates a runner that aborts scripts after `timeout`.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Creates a runner using `script_timeout_ms` from settings.
    #[must_use]
    pub const fn from_settings(settings: &ExecutionSettings) -> Self {
        Self::new(Duration::from_millis(settings.script_timeout_ms))
    }

    async fn run(
        &self,
        script: &str,
        context: &ScriptContext,
        cancel: &CancellationReceiver,
    ) -> Result<ScriptResult, ScriptRunnerError> {
        let commands = match parse_script(script) {
            Ok(commands) => commands,
            Err(e) => {
                warn!(phase = %context.phase, error = %e, "script did not parse");
                return Ok(ScriptResult::error(e.to_string()));
            }
        };

        debug!(phase = %context.phase, commands = commands.len(), "running script");
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ScriptRunnerError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, execute(&commands, context)) => {
                outcome.map_err(|_| ScriptRunnerError::Timeout(timeout_ms))
            }
        }
    }
}

async fn execute(commands: &[ScriptCommand], context: &ScriptContext) -> ScriptResult {
    let mut eval = Evaluator::new(context);
    let mut result = ScriptResult::success();

    for command in commands {
        match command {
            ScriptCommand::SetVariable { name, value } => {
                let value = eval.interpolate(value);
                eval.set(name, &value);
                result.set_variable(name.clone(), value);
            }
            ScriptCommand::Log { message } => {
                let message = eval.interpolate(message);
                debug!(target: "courier::script", phase = %context.phase, "{message}");
                result.add_log(message);
            }
            ScriptCommand::Test { name, condition } => {
                let test = if eval.evaluate(condition) {
                    TestResult::passed(name.clone())
                } else {
                    TestResult::failed(name.clone(), format!("condition was false: {condition}"))
                };
                result.add_test_result(test);
            }
            ScriptCommand::Assert { condition, message } => {
                if !eval.evaluate(condition) {
                    let message = message.as_deref().map_or_else(
                        || format!("Assertion failed: {condition}"),
                        |m| eval.interpolate(m),
                    );
                    result.add_error(message);
                    break;
                }
            }
            ScriptCommand::Delay { millis } => {
                tokio::time::sleep(Duration::from_millis(*millis)).await;
            }
        }
    }

    result
}

#[async_trait]
impl ScriptRunner for DslScriptRunner {
    async fn run_pre_request(
        &self,
        script: &str,
        context: &ScriptContext,
        cancel: &CancellationReceiver,
    ) -> Result<ScriptResult, ScriptRunnerError> {
        self.run(script, context, cancel).await
    }

    async fn run_post_response(
        &self,
        script: &str,
        context: &ScriptContext,
        cancel: &CancellationReceiver,
    ) -> Result<ScriptResult, ScriptRunnerError> {
        self.run(script, context, cancel).await
    }
}
