//! HTTP executor adapter using reqwest
//!
//! Implements the `RequestExecutor` port. The request handed in is already
//! resolved; this adapter applies auth, builds the body, races the call
//! against cancellation and folds every failure into an `ExecutionOutcome`.

use std::error::Error as _;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;
use url::Url;

use courier_application::ports::{CancellationReceiver, RequestExecutor};
use courier_domain::{
    auth::AuthResolution,
    request::{HttpMethod, RequestSpec},
    response::{ExecutionFailure, ExecutionOutcome, FailureKind, ResponseSpec},
    settings::ExecutionSettings,
};

use crate::http::{BuiltBody, build_body};

/// Status, headers and body bytes of a completed call.
type RawResponse = (u16, Vec<(String, String)>, Vec<u8>);

/// HTTP executor backed by a shared reqwest `Client`.
#[derive(Debug, Clone)]
pub struct ReqwestExecutor {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestExecutor {
    /// Creates an executor with its own client.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "Courier/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(default_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("Courier/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self::with_client(client, default_timeout))
    }

    /// Creates an executor using `default_request_timeout_ms` from settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn from_settings(settings: &ExecutionSettings) -> Result<Self, reqwest::Error> {
        Self::new(Duration::from_millis(settings.default_request_timeout_ms))
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, default_timeout: Duration) -> Self {
        Self {
            client,
            default_timeout,
        }
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Head => Method::HEAD,
            HttpMethod::Options => Method::OPTIONS,
        }
    }

    fn timeout_for(&self, request: &RequestSpec) -> Duration {
        request
            .timeout_ms
            .map_or(self.default_timeout, Duration::from_millis)
    }

    /// Turns the request into a reqwest builder. Errors here are the
    /// caller's fault and map to `FailureKind::InvalidRequest`.
    fn build(&self, request: &RequestSpec, timeout: Duration) -> Result<RequestBuilder, String> {
        let auth = request.auth.resolution();

        let mut url = request.full_url().map_err(|e| e.to_string())?;
        if let AuthResolution::QueryParam { name, value } = &auth {
            append_query(&mut url, name, value);
        }

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(timeout);

        for header in request.enabled_headers() {
            builder = builder.header(&header.key, &header.value);
        }

        match auth {
            AuthResolution::Header { name, value } => builder = builder.header(name, value),
            AuthResolution::Basic { username, password } => {
                builder = builder.basic_auth(username, Some(password));
            }
            AuthResolution::None | AuthResolution::QueryParam { .. } => {}
        }

        let has_content_type = request
            .enabled_headers()
            .any(|h| h.key.eq_ignore_ascii_case("content-type"));

        builder = match build_body(&request.body).map_err(|e| e.to_string())? {
            BuiltBody::None => builder,
            BuiltBody::Text {
                content,
                content_type,
            } => {
                if !has_content_type {
                    builder = builder.header("Content-Type", content_type);
                }
                builder.body(content)
            }
            BuiltBody::Multipart(form) => builder.multipart(form),
        };

        Ok(builder)
    }

    async fn send(builder: RequestBuilder) -> Result<RawResponse, reqwest::Error> {
        let response = builder.send().await?;
        let status = response.status().as_u16();

        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response.bytes().await?.to_vec();
        Ok((status, headers, body))
    }
}

fn append_query(url: &mut Url, name: &str, value: &str) {
    url.query_pairs_mut().append_pair(name, value);
}

/// Maps a reqwest error to a failure kind and a readable message.
fn classify(error: &reqwest::Error, timeout: Duration) -> (FailureKind, String) {
    if error.is_timeout() {
        return (
            FailureKind::Timeout,
            format!("request timed out after {}ms", timeout.as_millis()),
        );
    }

    let kind = if error.is_builder() {
        FailureKind::InvalidRequest
    } else {
        FailureKind::Network
    };

    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    (kind, message)
}

#[async_trait]
impl RequestExecutor for ReqwestExecutor {
    async fn execute(
        &self,
        request: &RequestSpec,
        cancel: &CancellationReceiver,
    ) -> ExecutionOutcome {
        let start = Instant::now();
        let timeout = self.timeout_for(request);

        let builder = match self.build(request, timeout) {
            Ok(builder) => builder,
            Err(message) => {
                return ExecutionOutcome::Failed(ExecutionFailure::new(
                    FailureKind::InvalidRequest,
                    message,
                    start.elapsed(),
                ));
            }
        };

        debug!(method = %request.method, url = %request.url, "sending request");

        tokio::select! {
            biased;
            () = cancel.cancelled() => ExecutionOutcome::Failed(ExecutionFailure::new(
                FailureKind::Cancelled,
                "request cancelled",
                start.elapsed(),
            )),
            result = Self::send(builder) => match result {
                Ok((status, headers, body)) => ExecutionOutcome::Completed(
                    ResponseSpec::new(status, headers, &body, start.elapsed()),
                ),
                Err(error) => {
                    let (kind, message) = classify(&error, timeout);
                    ExecutionOutcome::Failed(ExecutionFailure::new(kind, message, start.elapsed()))
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use courier_application::ports::CancellationToken;
    use courier_domain::auth::AuthConfig;

    fn executor() -> ReqwestExecutor {
        ReqwestExecutor::new(Duration::from_secs(5)).expect("client")
    }

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(ReqwestExecutor::to_reqwest_method(HttpMethod::Get), Method::GET);
        assert_eq!(ReqwestExecutor::to_reqwest_method(HttpMethod::Post), Method::POST);
        assert_eq!(ReqwestExecutor::to_reqwest_method(HttpMethod::Delete), Method::DELETE);
        assert_eq!(
            ReqwestExecutor::to_reqwest_method(HttpMethod::Options),
            Method::OPTIONS
        );
    }

    #[test]
    fn test_request_timeout_overrides_default() {
        let executor = executor();
        let mut request = RequestSpec::get("Test", "http://localhost/");
        assert_eq!(executor.timeout_for(&request), Duration::from_secs(5));

        request.timeout_ms = Some(250);
        assert_eq!(executor.timeout_for(&request), Duration::from_millis(250));
    }

    #[test]
    fn test_api_key_in_query_is_appended() {
        let mut request = RequestSpec::get("Test", "http://localhost/items")
            .with_query_param("page", "2");
        request.auth = AuthConfig::ApiKey {
            key: "k 1".to_string(),
            name: "api_key".to_string(),
            location: courier_domain::auth::ApiKeyLocation::Query,
        };

        let built = executor()
            .build(&request, Duration::from_secs(1))
            .expect("builds")
            .build()
            .expect("valid request");

        assert_eq!(
            built.url().as_str(),
            "http://localhost/items?page=2&api_key=k+1"
        );
    }

    #[test]
    fn test_bearer_and_body_headers() {
        let mut request = RequestSpec::get("Test", "http://localhost/")
            .with_body(courier_domain::request::RequestBody::json("{}"));
        request.method = HttpMethod::Post;
        request.auth = AuthConfig::bearer("abc");

        let built = executor()
            .build(&request, Duration::from_secs(1))
            .expect("builds")
            .build()
            .expect("valid request");

        assert_eq!(built.headers()["authorization"], "Bearer abc");
        assert_eq!(built.headers()["content-type"], "application/json");
    }

    #[test]
    fn test_basic_auth_header() {
        let mut request = RequestSpec::get("Test", "http://localhost/");
        request.auth = AuthConfig::basic("ada", "pw");

        let built = executor()
            .build(&request, Duration::from_secs(1))
            .expect("builds")
            .build()
            .expect("valid request");

        assert_eq!(built.headers()["authorization"], "Basic YWRhOnB3");
    }

    #[test]
    fn test_explicit_content_type_wins() {
        let request = RequestSpec::get("Test", "http://localhost/")
            .with_header("Content-Type", "application/vnd.api+json")
            .with_body(courier_domain::request::RequestBody::json("{}"));

        let built = executor()
            .build(&request, Duration::from_secs(1))
            .expect("builds")
            .build()
            .expect("valid request");

        let values: Vec<_> = built.headers().get_all("content-type").iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "application/vnd.api+json");
    }

    #[tokio::test]
    async fn test_unresolved_url_is_invalid_request() {
        let (_token, cancel) = CancellationToken::new();
        let request = RequestSpec::get("Test", "{{base_url}}/users");

        let outcome = executor().execute(&request, &cancel).await;

        let ExecutionOutcome::Failed(failure) = outcome else {
            panic!("Expected failure");
        };
        assert_eq!(failure.kind, FailureKind::InvalidRequest);

        let response = ExecutionOutcome::Failed(failure).into_response();
        assert_eq!(response.status, 0);
        assert_eq!(response.status_text, "Error");
    }

    #[tokio::test]
    async fn test_invalid_header_name_is_invalid_request() {
        let (_token, cancel) = CancellationToken::new();
        let request =
            RequestSpec::get("Test", "http://127.0.0.1:9/").with_header("bad header", "x");

        let outcome = executor().execute(&request, &cancel).await;

        let ExecutionOutcome::Failed(failure) = outcome else {
            panic!("Expected failure");
        };
        assert_eq!(failure.kind, FailureKind::InvalidRequest);
    }

    #[tokio::test]
    async fn test_cancelled_before_send() {
        let (token, cancel) = CancellationToken::new();
        token.cancel();
        let request = RequestSpec::get("Test", "http://127.0.0.1:9/");

        let outcome = executor().execute(&request, &cancel).await;

        let ExecutionOutcome::Failed(failure) = outcome else {
            panic!("Expected failure");
        };
        assert_eq!(failure.kind, FailureKind::Cancelled);
    }
}
