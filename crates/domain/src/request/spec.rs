//! Request specification type

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use super::{Header, HttpMethod, QueryParam, RequestBody};
use crate::auth::AuthConfig;
use crate::error::{DomainError, DomainResult};

/// Complete specification for an HTTP request.
///
/// Treated as an immutable value: template resolution builds a new
/// instance and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSpec {
    /// Unique identifier for this request
    pub id: Uuid,
    /// Human-readable name
    pub name: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Target URL (may contain variable placeholders)
    pub url: String,
    /// Ordered request headers
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Ordered query parameters, appended to `url` when sent
    #[serde(default)]
    pub query_params: Vec<QueryParam>,
    /// Request body
    #[serde(default)]
    pub body: RequestBody,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Script run before the request is resolved and sent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_request_script: Option<String>,
    /// Script run after the response arrives
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_response_script: Option<String>,
    /// Per-request timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl RequestSpec {
    /// Creates a new request specification with default values.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            method: HttpMethod::default(),
            url: String::new(),
            headers: Vec::new(),
            query_params: Vec::new(),
            body: RequestBody::None,
            auth: AuthConfig::None,
            pre_request_script: None,
            post_response_script: None,
            timeout_ms: None,
        }
    }

    /// Creates a GET request with the given URL.
    #[must_use]
    pub fn get(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::new(name)
        }
    }

    /// Adds a header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push(QueryParam::new(key, value));
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// Sets the pre-request script.
    #[must_use]
    pub fn with_pre_request_script(mut self, script: impl Into<String>) -> Self {
        self.pre_request_script = Some(script.into());
        self
    }

    /// Sets the post-response script.
    #[must_use]
    pub fn with_post_response_script(mut self, script: impl Into<String>) -> Self {
        self.post_response_script = Some(script.into());
        self
    }

    /// Returns the pre-request script if it has any non-whitespace content.
    #[must_use]
    pub fn pre_request_script(&self) -> Option<&str> {
        non_blank(self.pre_request_script.as_deref())
    }

    /// Returns the post-response script if it has any non-whitespace content.
    #[must_use]
    pub fn post_response_script(&self) -> Option<&str> {
        non_blank(self.post_response_script.as_deref())
    }

    /// Returns an iterator over enabled headers.
    pub fn enabled_headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter().filter(|h| h.enabled)
    }

    /// Returns an iterator over enabled query parameters.
    pub fn enabled_query_params(&self) -> impl Iterator<Item = &QueryParam> {
        self.query_params.iter().filter(|p| p.enabled)
    }

    /// Builds the URL that goes on the wire: `url` plus enabled query params.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidUrl` if the URL is malformed, which
    /// includes URLs still carrying unresolved placeholders in the host.
    pub fn full_url(&self) -> DomainResult<Url> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| DomainError::InvalidUrl(format!("{e}: {}", self.url)))?;

        let mut params = self.enabled_query_params().peekable();
        if params.peek().is_some() {
            let mut pairs = url.query_pairs_mut();
            for param in params {
                pairs.append_pair(&param.key, &param.value);
            }
        }

        Ok(url)
    }

    /// Returns true if any template placeholder remains in the URL.
    #[must_use]
    pub fn has_variables(&self) -> bool {
        self.url.contains("{{") && self.url.contains("}}")
    }
}

fn non_blank(script: Option<&str>) -> Option<&str> {
    script.filter(|s| !s.trim().is_empty())
}

impl Default for RequestSpec {
    fn default() -> Self {
        Self::new("New Request")
    }
}
