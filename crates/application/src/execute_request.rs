//! Execute Request Use Case
//!
//! Runs one request end to end:
//! pre-request script → resolve → execute → post-response script → aggregate.
//!
//! Every step races the cancellation signal. Script-engine and store errors
//! propagate; transport failures never do, they arrive as a status-0
//! response.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use courier_domain::environment::{Environment, VariableMap, VariableScopes};
use courier_domain::request::RequestSpec;
use courier_domain::response::{ExecutionOutcome, ResponseSpec};
use courier_domain::scripting::{ScriptContext, ScriptPhase, ScriptResult, TestResult};
use courier_domain::settings::ExecutionSettings;

use crate::ports::{
    CancellationReceiver, EnvironmentStore, EnvironmentStoreError, RequestExecutor, ScriptRunner,
    ScriptRunnerError, SecretLookup,
};
use crate::variable_resolver::{ResolutionContext, ResolveError, resolve_request_async};

/// Error type for the execute request use case.
#[derive(Debug, Error)]
pub enum ExecuteRequestError {
    /// Reading or writing the environment failed.
    #[error(transparent)]
    EnvironmentStore(#[from] EnvironmentStoreError),

    /// The script engine failed.
    #[error(transparent)]
    ScriptRunner(#[from] ScriptRunnerError),

    /// Resolution failed under `ThrowError`.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The run was cancelled.
    #[error("request run cancelled")]
    Cancelled,
}

/// Everything one run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRunResult {
    /// Response, status 0 when the transport failed.
    pub response: ResponseSpec,
    /// The request as it was sent.
    pub resolved_request: RequestSpec,
    /// Pre-request script result, if a script ran.
    pub pre_request_result: Option<ScriptResult>,
    /// Post-response script result, if a script ran.
    pub post_response_result: Option<ScriptResult>,
    /// Environment after the run: re-read when
    /// `refresh_after_post_response` is set, otherwise the snapshot used
    /// for resolution.
    pub final_environment: VariableMap,
}

impl RequestRunResult {
    fn script_results(&self) -> impl Iterator<Item = &ScriptResult> {
        self.pre_request_result
            .iter()
            .chain(self.post_response_result.iter())
    }

    /// True if either phase reports failure.
    #[must_use]
    pub fn has_script_errors(&self) -> bool {
        self.script_results().any(|result| !result.success)
    }

    /// Test results, pre-request first.
    #[must_use]
    pub fn all_test_results(&self) -> Vec<TestResult> {
        self.script_results()
            .flat_map(|result| result.test_results.iter().cloned())
            .collect()
    }

    /// Log lines, pre-request first.
    #[must_use]
    pub fn all_logs(&self) -> Vec<String> {
        self.script_results()
            .flat_map(|result| result.logs.iter().cloned())
            .collect()
    }

    /// Error messages, pre-request first.
    #[must_use]
    pub fn all_errors(&self) -> Vec<String> {
        self.script_results()
            .flat_map(|result| result.errors.iter().cloned())
            .collect()
    }
}

/// Use case for running a request through scripts, resolution and the
/// transport.
///
/// # Example
///
/// ```ignore
/// let use_case = ExecuteRequest::new(Arc::new(store), Arc::new(runner), Arc::new(executor))
///     .with_global_variables(globals)
///     .with_vault(vault);
///
/// let (_token, cancel) = CancellationToken::new();
/// let result = use_case.execute(&request, &cancel).await?;
/// ```
pub struct ExecuteRequest<S, R, X>
where
    S: EnvironmentStore,
    R: ScriptRunner,
    X: RequestExecutor,
{
    store: Arc<S>,
    runner: Arc<R>,
    executor: Arc<X>,
    collection: VariableMap,
    global: VariableMap,
    vault: Option<Arc<dyn SecretLookup>>,
    settings: ExecutionSettings,
}

impl<S, R, X> ExecuteRequest<S, R, X>
where
    S: EnvironmentStore,
    R: ScriptRunner,
    X: RequestExecutor,
{
    /// Creates the use case with default settings and empty collection and
    /// global scopes.
    pub fn new(store: Arc<S>, runner: Arc<R>, executor: Arc<X>) -> Self {
        Self {
            store,
            runner,
            executor,
            collection: VariableMap::new(),
            global: VariableMap::new(),
            vault: None,
            settings: ExecutionSettings::default(),
        }
    }

    /// Sets the collection scope.
    #[must_use]
    pub fn with_collection_variables(mut self, collection: VariableMap) -> Self {
        self.collection = collection;
        self
    }

    /// Sets the global scope.
    #[must_use]
    pub fn with_global_variables(mut self, global: VariableMap) -> Self {
        self.global = global;
        self
    }

    /// Enables `{{vault:name}}` references.
    #[must_use]
    pub fn with_vault(mut self, vault: Arc<dyn SecretLookup>) -> Self {
        self.vault = Some(vault);
        self
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ExecutionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the active settings.
    #[must_use]
    pub const fn settings(&self) -> &ExecutionSettings {
        &self.settings
    }

    /// Runs `request` end to end.
    ///
    /// A failed pre-request script does not stop the HTTP call, and a failed
    /// HTTP call does not stop the post-response script.
    ///
    /// # Errors
    ///
    /// Returns `ExecuteRequestError::Cancelled` as soon as `cancel` fires;
    /// store and script-engine errors are passed through unchanged.
    pub async fn execute(
        &self,
        request: &RequestSpec,
        cancel: &CancellationReceiver,
    ) -> Result<RequestRunResult, ExecuteRequestError> {
        let (mut has_active, mut environment) = self.active_variables(cancel).await?;

        let pre_request_result = match request.pre_request_script() {
            Some(script) => {
                debug!(request = %request.name, "running pre-request script");
                let context = ScriptContext::pre_request(request.clone(), environment.clone());
                let result = race(
                    cancel,
                    self.runner.run_pre_request(script, &context, cancel),
                )
                .await??;
                report_script(ScriptPhase::PreRequest, &result);
                self.apply_updates(&result, has_active, cancel).await?;
                (has_active, environment) = self.active_variables(cancel).await?;
                Some(result)
            }
            None => None,
        };

        debug!(request = %request.name, "resolving request");
        let context = self.resolution_context(environment.clone());
        let resolved = race(
            cancel,
            resolve_request_async(request, &context, self.settings.unresolved_policy),
        )
        .await??;

        debug!(method = %resolved.method, url = %resolved.url, "executing request");
        let outcome = race(cancel, self.executor.execute(&resolved, cancel)).await?;
        if let ExecutionOutcome::Failed(failure) = &outcome {
            warn!(url = %resolved.url, error = %failure, "request failed");
        }
        let response = outcome.into_response();

        let post_response_result = match request.post_response_script() {
            Some(script) => {
                debug!(request = %request.name, "running post-response script");
                let context = ScriptContext::post_response(
                    resolved.clone(),
                    response.clone(),
                    environment.clone(),
                );
                let result = race(
                    cancel,
                    self.runner.run_post_response(script, &context, cancel),
                )
                .await??;
                report_script(ScriptPhase::PostResponse, &result);
                self.apply_updates(&result, has_active, cancel).await?;
                Some(result)
            }
            None => None,
        };

        let final_environment = if self.settings.refresh_after_post_response {
            self.active_variables(cancel).await?.1
        } else {
            environment
        };

        info!(
            request = %request.name,
            status = response.status,
            elapsed_ms = response.elapsed_ms(),
            "request run completed"
        );

        Ok(RequestRunResult {
            response,
            resolved_request: resolved,
            pre_request_result,
            post_response_result,
            final_environment,
        })
    }

    /// Reads the active environment's variables. The flag is false when no
    /// environment is active, in which case the map is empty.
    async fn active_variables(
        &self,
        cancel: &CancellationReceiver,
    ) -> Result<(bool, VariableMap), ExecuteRequestError> {
        let environment = race(cancel, self.store.get_active(cancel)).await??;
        Ok(environment.map_or_else(
            || (false, VariableMap::new()),
            |env: Environment| (true, env.variables),
        ))
    }

    /// Writes updates one key at a time, in key order. Stops at the first
    /// failed write; earlier writes stand. With no active environment the
    /// updates are dropped.
    async fn apply_updates(
        &self,
        result: &ScriptResult,
        has_active: bool,
        cancel: &CancellationReceiver,
    ) -> Result<(), ExecuteRequestError> {
        let Some(updates) = result.environment_updates.as_ref().filter(|u| !u.is_empty()) else {
            return Ok(());
        };
        if !has_active {
            warn!(count = updates.len(), "no active environment, skipping updates");
            return Ok(());
        }

        for (key, value) in updates {
            race(cancel, self.store.set_variable(key, value, cancel)).await??;
        }
        debug!(count = updates.len(), "applied environment updates");
        Ok(())
    }

    fn resolution_context(&self, environment: VariableMap) -> ResolutionContext {
        let scopes = VariableScopes::new()
            .with_environment(environment)
            .with_collection(self.collection.clone())
            .with_global(self.global.clone());

        let context = ResolutionContext::new(scopes);
        match &self.vault {
            Some(vault) => context.with_vault(Arc::clone(vault)),
            None => context,
        }
    }
}

fn report_script(phase: ScriptPhase, result: &ScriptResult) {
    if result.success {
        debug!(%phase, tests = result.test_results.len(), "script finished");
    } else {
        warn!(%phase, errors = ?result.errors, "script reported failure");
    }
}

/// Races `future` against cancellation. Cancellation wins ties.
async fn race<T>(
    cancel: &CancellationReceiver,
    future: impl Future<Output = T>,
) -> Result<T, ExecuteRequestError> {
    if cancel.is_cancelled() {
        return Err(ExecuteRequestError::Cancelled);
    }

    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(ExecuteRequestError::Cancelled),
        value = future => Ok(value),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use courier_domain::response::{ExecutionFailure, FailureKind};
    use pretty_assertions::assert_eq;

    use crate::ports::CancellationToken;

    /// In-memory environment store recording every write.
    #[derive(Default)]
    struct MockEnvironmentStore {
        environment: Mutex<Option<Environment>>,
        writes: Mutex<Vec<(String, String)>>,
        reads: Mutex<usize>,
        fail_on_key: Option<String>,
    }

    impl MockEnvironmentStore {
        fn with_variables(pairs: &[(&str, &str)]) -> Self {
            let mut env = Environment::new("test");
            for (k, v) in pairs {
                env.set_variable(*k, *v);
            }
            Self {
                environment: Mutex::new(Some(env)),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl EnvironmentStore for MockEnvironmentStore {
        async fn get_active(
            &self,
            _cancel: &CancellationReceiver,
        ) -> Result<Option<Environment>, EnvironmentStoreError> {
            *self.reads.lock().unwrap() += 1;
            Ok(self.environment.lock().unwrap().clone())
        }

        async fn set_variable(
            &self,
            key: &str,
            value: &str,
            _cancel: &CancellationReceiver,
        ) -> Result<(), EnvironmentStoreError> {
            if self.fail_on_key.as_deref() == Some(key) {
                return Err(EnvironmentStoreError::Serialization(format!("cannot write {key}")));
            }
            self.writes
                .lock()
                .unwrap()
                .push((key.to_string(), value.to_string()));
            let mut guard = self.environment.lock().unwrap();
            let env = guard.as_mut().ok_or(EnvironmentStoreError::NoActiveEnvironment)?;
            env.set_variable(key, value);
            Ok(())
        }
    }

    /// Script runner returning canned results and recording contexts.
    #[derive(Default)]
    struct MockScriptRunner {
        pre: Option<ScriptResult>,
        post: Option<ScriptResult>,
        contexts: Mutex<Vec<ScriptContext>>,
        engine_error: bool,
    }

    impl MockScriptRunner {
        fn run(
            &self,
            context: &ScriptContext,
            canned: Option<&ScriptResult>,
        ) -> Result<ScriptResult, ScriptRunnerError> {
            if self.engine_error {
                return Err(ScriptRunnerError::Engine("engine crashed".to_string()));
            }
            self.contexts.lock().unwrap().push(context.clone());
            Ok(canned.cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl ScriptRunner for MockScriptRunner {
        async fn run_pre_request(
            &self,
            _script: &str,
            context: &ScriptContext,
            _cancel: &CancellationReceiver,
        ) -> Result<ScriptResult, ScriptRunnerError> {
            self.run(context, self.pre.as_ref())
        }

        async fn run_post_response(
            &self,
            _script: &str,
            context: &ScriptContext,
            _cancel: &CancellationReceiver,
        ) -> Result<ScriptResult, ScriptRunnerError> {
            self.run(context, self.post.as_ref())
        }
    }

    /// Executor returning a fixed outcome and recording what it was sent.
    struct MockExecutor {
        outcome: ExecutionOutcome,
        sent: Mutex<Vec<RequestSpec>>,
        delay: Option<Duration>,
    }

    impl MockExecutor {
        fn ok() -> Self {
            Self {
                outcome: ExecutionOutcome::Completed(ResponseSpec::new(
                    200,
                    vec![("content-type".to_string(), "application/json".to_string())],
                    b"{\"ok\":true}",
                    Duration::from_millis(12),
                )),
                sent: Mutex::new(Vec::new()),
                delay: None,
            }
        }

        fn failing(kind: FailureKind) -> Self {
            Self {
                outcome: ExecutionOutcome::Failed(ExecutionFailure::new(
                    kind,
                    "connection refused",
                    Duration::from_millis(3),
                )),
                ..Self::ok()
            }
        }

        fn last_sent(&self) -> RequestSpec {
            self.sent.lock().unwrap().last().cloned().expect("request sent")
        }
    }

    #[async_trait]
    impl RequestExecutor for MockExecutor {
        async fn execute(
            &self,
            request: &RequestSpec,
            _cancel: &CancellationReceiver,
        ) -> ExecutionOutcome {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.sent.lock().unwrap().push(request.clone());
            self.outcome.clone()
        }
    }

    fn use_case(
        store: MockEnvironmentStore,
        runner: MockScriptRunner,
        executor: MockExecutor,
    ) -> ExecuteRequest<MockEnvironmentStore, MockScriptRunner, MockExecutor> {
        ExecuteRequest::new(Arc::new(store), Arc::new(runner), Arc::new(executor))
    }

    fn map(pairs: &[(&str, &str)]) -> VariableMap {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[tokio::test]
    async fn no_scripts_yields_no_script_results() {
        let uc = use_case(
            MockEnvironmentStore::default(),
            MockScriptRunner::default(),
            MockExecutor::ok(),
        );
        let request = RequestSpec::get("plain", "https://example.com");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.response.status, 200);
        assert!(result.pre_request_result.is_none());
        assert!(result.post_response_result.is_none());
        assert!(result.all_test_results().is_empty());
        assert!(!result.has_script_errors());
    }

    #[tokio::test]
    async fn base_url_resolved_from_environment() {
        let store = MockEnvironmentStore::with_variables(&[("baseUrl", "https://api.example.com")]);
        let uc = use_case(store, MockScriptRunner::default(), MockExecutor::ok());
        let request = RequestSpec::get("users", "{{baseUrl}}/users");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.resolved_request.url, "https://api.example.com/users");
        assert_eq!(uc.executor.last_sent().url, "https://api.example.com/users");
    }

    #[tokio::test]
    async fn environment_beats_collection_and_global() {
        let store = MockEnvironmentStore::with_variables(&[("host", "env")]);
        let uc = use_case(store, MockScriptRunner::default(), MockExecutor::ok())
            .with_collection_variables(map(&[("host", "collection"), ("path", "c-path")]))
            .with_global_variables(map(&[("host", "global"), ("path", "g-path"), ("v", "1")]));
        let request = RequestSpec::get("r", "https://{{host}}/{{path}}/{{v}}");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.resolved_request.url, "https://env/c-path/1");
    }

    #[tokio::test]
    async fn pre_script_update_is_visible_in_sent_request() {
        let store = MockEnvironmentStore::with_variables(&[("token", "old")]);
        let mut pre = ScriptResult::success();
        pre.set_variable("token", "fresh");
        let runner = MockScriptRunner {
            pre: Some(pre),
            ..Default::default()
        };
        let uc = use_case(store, runner, MockExecutor::ok());
        let request = RequestSpec::get("auth", "https://example.com")
            .with_header("Authorization", "Bearer {{token}}")
            .with_pre_request_script("set(\"token\", \"fresh\")");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(uc.executor.last_sent().headers[0].value, "Bearer fresh");
        assert_eq!(
            *uc.store.writes.lock().unwrap(),
            vec![("token".to_string(), "fresh".to_string())]
        );
        assert_eq!(result.final_environment.get("token").map(String::as_str), Some("fresh"));
        // initial read plus the re-read after the pre-request writes
        assert_eq!(*uc.store.reads.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn updates_without_active_environment_are_skipped() {
        let mut pre = ScriptResult::success();
        pre.set_variable("token", "abc");
        let mut post = ScriptResult::success();
        post.set_variable("seen", "1");
        let runner = MockScriptRunner {
            pre: Some(pre),
            post: Some(post),
            ..Default::default()
        };
        let uc = use_case(MockEnvironmentStore::default(), runner, MockExecutor::ok());
        let request = RequestSpec::get("r", "http://127.0.0.1:1/{{token}}")
            .with_pre_request_script("set(\"token\", \"abc\")")
            .with_post_response_script("set(\"seen\", \"1\")");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(uc.executor.sent.lock().unwrap().len(), 1);
        assert_eq!(uc.executor.last_sent().url, "http://127.0.0.1:1/{{token}}");
        assert!(uc.store.writes.lock().unwrap().is_empty());
        assert!(result.final_environment.is_empty());
        assert_eq!(result.response.status, 200);
    }

    #[tokio::test]
    async fn post_script_sees_resolved_request_and_response() {
        let store = MockEnvironmentStore::with_variables(&[("host", "example.com")]);
        let runner = MockScriptRunner::default();
        let uc = use_case(store, runner, MockExecutor::ok());
        let request = RequestSpec::get("r", "https://{{host}}/")
            .with_post_response_script("test(\"ok\", status == 200)");

        uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        let contexts = uc.runner.contexts.lock().unwrap();
        assert_eq!(contexts.len(), 1);
        assert_eq!(contexts[0].phase, ScriptPhase::PostResponse);
        assert_eq!(contexts[0].request.url, "https://example.com/");
        assert_eq!(contexts[0].response.as_ref().map(|r| r.status), Some(200));
    }

    #[tokio::test]
    async fn aggregates_pre_then_post() {
        let mut pre = ScriptResult::success();
        pre.add_log("pre log");
        pre.add_test_result(TestResult::passed("pre test"));
        pre.add_error("pre error");

        let mut post = ScriptResult::success();
        post.add_log("post log");
        post.add_test_result(TestResult::failed("post test", "expected 201"));

        let runner = MockScriptRunner {
            pre: Some(pre),
            post: Some(post),
            ..Default::default()
        };
        let uc = use_case(MockEnvironmentStore::default(), runner, MockExecutor::ok());
        let request = RequestSpec::get("r", "https://example.com")
            .with_pre_request_script("log(\"pre\")")
            .with_post_response_script("log(\"post\")");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert!(result.has_script_errors());
        assert_eq!(result.all_logs(), vec!["pre log", "post log"]);
        assert_eq!(result.all_errors(), vec!["pre error"]);
        let names: Vec<_> = result
            .all_test_results()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["pre test", "post test"]);
    }

    #[tokio::test]
    async fn failed_pre_script_still_sends_request() {
        let runner = MockScriptRunner {
            pre: Some(ScriptResult::error("ReferenceError")),
            ..Default::default()
        };
        let uc = use_case(MockEnvironmentStore::default(), runner, MockExecutor::ok());
        let request =
            RequestSpec::get("r", "https://example.com").with_pre_request_script("broken(");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.response.status, 200);
        assert!(result.has_script_errors());
        assert_eq!(uc.executor.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_transport_still_runs_post_script() {
        let uc = use_case(
            MockEnvironmentStore::default(),
            MockScriptRunner::default(),
            MockExecutor::failing(FailureKind::Network),
        );
        let request = RequestSpec::get("r", "https://unreachable.invalid")
            .with_post_response_script("log(\"after\")");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.response.status, 0);
        assert_eq!(result.response.status_text, "Error");
        assert!(result.post_response_result.is_some());
        let contexts = uc.runner.contexts.lock().unwrap();
        assert_eq!(contexts[0].response.as_ref().map(|r| r.status), Some(0));
    }

    #[tokio::test]
    async fn script_engine_error_propagates() {
        let runner = MockScriptRunner {
            engine_error: true,
            ..Default::default()
        };
        let uc = use_case(MockEnvironmentStore::default(), runner, MockExecutor::ok());
        let request = RequestSpec::get("r", "https://example.com").with_pre_request_script("x");

        let err = uc
            .execute(&request, &CancellationReceiver::never())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecuteRequestError::ScriptRunner(ScriptRunnerError::Engine(_))
        ));
        assert!(uc.executor.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_error_stops_updates_in_key_order() {
        let mut store = MockEnvironmentStore::with_variables(&[]);
        store.fail_on_key = Some("b".to_string());
        let mut pre = ScriptResult::success();
        pre.set_variable("c", "3");
        pre.set_variable("a", "1");
        pre.set_variable("b", "2");
        let runner = MockScriptRunner {
            pre: Some(pre),
            ..Default::default()
        };
        let uc = use_case(store, runner, MockExecutor::ok());
        let request = RequestSpec::get("r", "https://example.com").with_pre_request_script("x");

        let err = uc
            .execute(&request, &CancellationReceiver::never())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecuteRequestError::EnvironmentStore(EnvironmentStoreError::Serialization(_))
        ));
        assert_eq!(
            *uc.store.writes.lock().unwrap(),
            vec![("a".to_string(), "1".to_string())]
        );
        assert!(uc.executor.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn post_writes_not_refetched_by_default() {
        let store = MockEnvironmentStore::with_variables(&[("count", "1")]);
        let mut post = ScriptResult::success();
        post.set_variable("count", "2");
        let runner = MockScriptRunner {
            post: Some(post),
            ..Default::default()
        };
        let uc = use_case(store, runner, MockExecutor::ok());
        let request = RequestSpec::get("r", "https://example.com").with_post_response_script("x");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.final_environment.get("count").map(String::as_str), Some("1"));
        assert_eq!(*uc.store.reads.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn post_writes_refetched_when_enabled() {
        let store = MockEnvironmentStore::with_variables(&[("count", "1")]);
        let mut post = ScriptResult::success();
        post.set_variable("count", "2");
        let runner = MockScriptRunner {
            post: Some(post),
            ..Default::default()
        };
        let settings = ExecutionSettings {
            refresh_after_post_response: true,
            ..ExecutionSettings::default()
        };
        let uc = use_case(store, runner, MockExecutor::ok()).with_settings(settings);
        let request = RequestSpec::get("r", "https://example.com").with_post_response_script("x");

        let result = uc.execute(&request, &CancellationReceiver::never()).await.unwrap();

        assert_eq!(result.final_environment.get("count").map(String::as_str), Some("2"));
    }

    #[tokio::test]
    async fn throw_error_policy_fails_before_sending() {
        let settings = ExecutionSettings {
            unresolved_policy: courier_domain::environment::ResolutionPolicy::ThrowError,
            ..ExecutionSettings::default()
        };
        let uc = use_case(
            MockEnvironmentStore::default(),
            MockScriptRunner::default(),
            MockExecutor::ok(),
        )
        .with_settings(settings);
        let request = RequestSpec::get("r", "https://{{host}}/");

        let err = uc
            .execute(&request, &CancellationReceiver::never())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ExecuteRequestError::Resolve(ResolveError::Unresolved { ref name }) if name == "host"
        ));
    }

    #[tokio::test]
    async fn cancelled_before_start() {
        let (token, cancel) = CancellationToken::new();
        token.cancel();
        let uc = use_case(
            MockEnvironmentStore::default(),
            MockScriptRunner::default(),
            MockExecutor::ok(),
        );

        let err = uc
            .execute(&RequestSpec::get("r", "https://example.com"), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecuteRequestError::Cancelled));
        assert_eq!(*uc.store.reads.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn cancelled_during_http_call() {
        let (token, cancel) = CancellationToken::new();
        let executor = MockExecutor {
            delay: Some(Duration::from_secs(30)),
            ..MockExecutor::ok()
        };
        let uc = Arc::new(use_case(
            MockEnvironmentStore::default(),
            MockScriptRunner::default(),
            executor,
        ));

        let task = {
            let uc = Arc::clone(&uc);
            tokio::spawn(async move {
                uc.execute(&RequestSpec::get("r", "https://example.com"), &cancel)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("cancel should be prompt")
            .expect("task should not panic");
        assert!(matches!(result, Err(ExecuteRequestError::Cancelled)));
    }
}
