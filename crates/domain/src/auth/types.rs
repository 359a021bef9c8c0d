//! Authentication configuration types

use serde::{Deserialize, Serialize};

/// Authentication configuration for a request.
///
/// Values are carried verbatim through template resolution; applying them
/// to the outgoing request is the executor's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthConfig {
    /// No authentication
    #[default]
    None,
    /// API Key authentication
    ApiKey {
        /// The API key value
        key: String,
        /// Header or query parameter name
        name: String,
        /// Where to add the key
        location: ApiKeyLocation,
    },
    /// Bearer token authentication
    Bearer {
        /// The bearer token (may contain variables like `{{access_token}}`)
        token: String,
        /// Optional prefix, defaults to "Bearer"
        #[serde(default = "default_bearer_prefix")]
        prefix: String,
    },
    /// Basic authentication
    Basic {
        /// Username (may contain variables)
        username: String,
        /// Password (may contain variables)
        password: String,
    },
}

fn default_bearer_prefix() -> String {
    "Bearer".to_string()
}

/// Location for API key authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyLocation {
    /// Add to request headers
    #[default]
    Header,
    /// Add to query parameters
    Query,
}

impl AuthConfig {
    /// Creates a bearer token authentication.
    #[must_use]
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
            prefix: default_bearer_prefix(),
        }
    }

    /// Creates a basic authentication.
    #[must_use]
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Describes how this configuration is applied to an outgoing request.
    #[must_use]
    pub fn resolution(&self) -> AuthResolution {
        match self {
            Self::None => AuthResolution::None,
            Self::ApiKey {
                key,
                name,
                location: ApiKeyLocation::Header,
            } => AuthResolution::Header {
                name: name.clone(),
                value: key.clone(),
            },
            Self::ApiKey {
                key,
                name,
                location: ApiKeyLocation::Query,
            } => AuthResolution::QueryParam {
                name: name.clone(),
                value: key.clone(),
            },
            Self::Bearer { token, prefix } => AuthResolution::Header {
                name: "Authorization".to_string(),
                value: format!("{prefix} {token}"),
            },
            Self::Basic { username, password } => AuthResolution::Basic {
                username: username.clone(),
                password: password.clone(),
            },
        }
    }
}

/// Result of an authentication resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResolution {
    /// No authentication needed.
    None,
    /// Add this header to the request.
    Header {
        /// Header name (e.g., "Authorization").
        name: String,
        /// Header value (e.g., "Bearer token123").
        value: String,
    },
    /// Add this query parameter.
    QueryParam {
        /// Query parameter name.
        name: String,
        /// Query parameter value.
        value: String,
    },
    /// Encode these credentials as HTTP Basic.
    Basic {
        /// Username.
        username: String,
        /// Password.
        password: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_none() {
        let auth = AuthConfig::default();
        assert_eq!(auth.resolution(), AuthResolution::None);
    }

    #[test]
    fn test_bearer_auth() {
        let auth = AuthConfig::bearer("my-token");
        assert_eq!(
            auth.resolution(),
            AuthResolution::Header {
                name: "Authorization".to_string(),
                value: "Bearer my-token".to_string(),
            }
        );
    }

    #[test]
    fn test_basic_keeps_credentials_unencoded() {
        assert_eq!(
            AuthConfig::basic("ada", "{{password}}").resolution(),
            AuthResolution::Basic {
                username: "ada".to_string(),
                password: "{{password}}".to_string(),
            }
        );
    }

    #[test]
    fn test_api_key_in_query() {
        let auth = AuthConfig::ApiKey {
            key: "k-123".to_string(),
            name: "api_key".to_string(),
            location: ApiKeyLocation::Query,
        };
        assert_eq!(
            auth.resolution(),
            AuthResolution::QueryParam {
                name: "api_key".to_string(),
                value: "k-123".to_string(),
            }
        );
    }

    #[test]
    fn test_bearer_prefix_defaults_on_deserialize() {
        let auth: AuthConfig =
            serde_json::from_str(r#"{"type":"bearer","token":"t"}"#).expect("valid json");
        assert_eq!(auth, AuthConfig::bearer("t"));
    }
}
