//! Whole-request resolution
//!
//! Applies template resolution to the URL, header keys and values, query
//! parameter keys and values, raw body text and form field keys and values.
//! Method, auth, scripts and timeout are carried over untouched. Nothing is
//! escaped or URL-encoded.

use courier_domain::environment::{ResolutionPolicy, VariableMap};
use courier_domain::request::{RequestBody, RequestSpec};

use super::context::ResolutionContext;
use super::engine::{ResolveError, resolve, resolve_async};

/// Resolves a request against one flat map, producing a new request.
///
/// # Errors
/// Returns `ResolveError::Unresolved` under `ResolutionPolicy::ThrowError`.
pub fn resolve_request(
    request: &RequestSpec,
    variables: &VariableMap,
    policy: ResolutionPolicy,
) -> Result<RequestSpec, ResolveError> {
    let mut resolved = request.clone();
    resolved.url = resolve(&request.url, variables, policy)?;

    for header in &mut resolved.headers {
        header.key = resolve(&header.key, variables, policy)?;
        header.value = resolve(&header.value, variables, policy)?;
    }
    for param in &mut resolved.query_params {
        param.key = resolve(&param.key, variables, policy)?;
        param.value = resolve(&param.value, variables, policy)?;
    }

    match &mut resolved.body {
        RequestBody::None => {}
        RequestBody::Raw { content, .. } => *content = resolve(content, variables, policy)?,
        RequestBody::UrlEncoded { fields } | RequestBody::Multipart { fields } => {
            for field in fields {
                field.key = resolve(&field.key, variables, policy)?;
                field.value = resolve(&field.value, variables, policy)?;
            }
        }
    }

    Ok(resolved)
}

/// Resolves a request against a scope-aware context, producing a new request.
///
/// # Errors
/// Returns `ResolveError::Unresolved` under `ResolutionPolicy::ThrowError`.
pub async fn resolve_request_async(
    request: &RequestSpec,
    context: &ResolutionContext,
    policy: ResolutionPolicy,
) -> Result<RequestSpec, ResolveError> {
    let mut resolved = request.clone();
    resolved.url = resolve_async(&request.url, context, policy).await?;

    for header in &mut resolved.headers {
        header.key = resolve_async(&header.key, context, policy).await?;
        header.value = resolve_async(&header.value, context, policy).await?;
    }
    for param in &mut resolved.query_params {
        param.key = resolve_async(&param.key, context, policy).await?;
        param.value = resolve_async(&param.value, context, policy).await?;
    }

    match &mut resolved.body {
        RequestBody::None => {}
        RequestBody::Raw { content, .. } => {
            *content = resolve_async(content, context, policy).await?;
        }
        RequestBody::UrlEncoded { fields } | RequestBody::Multipart { fields } => {
            for field in fields {
                field.key = resolve_async(&field.key, context, policy).await?;
                field.value = resolve_async(&field.value, context, policy).await?;
            }
        }
    }

    Ok(resolved)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use courier_domain::auth::AuthConfig;
    use courier_domain::environment::VariableScopes;
    use courier_domain::request::FormField;
    use pretty_assertions::assert_eq;

    fn vars() -> VariableMap {
        [
            ("base_url", "https://api.example.com"),
            ("token", "abc123"),
            ("user", "ada"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
    }

    fn templated_request() -> RequestSpec {
        let mut request = RequestSpec::get("user", "{{base_url}}/users/{{user}}")
            .with_header("Authorization", "Bearer {{token}}")
            .with_query_param("{{user}}", "{{missing}}")
            .with_body(RequestBody::json(r#"{"name":"{{user}}"}"#))
            .with_pre_request_script("log(\"{{token}}\")");
        request.auth = AuthConfig::bearer("{{token}}");
        request.timeout_ms = Some(1_000);
        request
    }

    #[test]
    fn resolves_every_text_field() {
        let resolved =
            resolve_request(&templated_request(), &vars(), ResolutionPolicy::LeaveAsIs).unwrap();

        assert_eq!(resolved.url, "https://api.example.com/users/ada");
        assert_eq!(resolved.headers[0].value, "Bearer abc123");
        assert_eq!(resolved.query_params[0].key, "ada");
        assert_eq!(resolved.query_params[0].value, "{{missing}}");
        assert_eq!(
            resolved.body,
            RequestBody::json(r#"{"name":"ada"}"#)
        );
    }

    #[test]
    fn passthrough_fields_are_untouched() {
        let original = templated_request();
        let resolved = resolve_request(&original, &vars(), ResolutionPolicy::LeaveAsIs).unwrap();

        assert_eq!(resolved.id, original.id);
        assert_eq!(resolved.method, original.method);
        assert_eq!(resolved.auth, original.auth);
        assert_eq!(resolved.pre_request_script, original.pre_request_script);
        assert_eq!(resolved.timeout_ms, Some(1_000));
        assert_eq!(original.url, "{{base_url}}/users/{{user}}");
    }

    #[test]
    fn throw_error_names_first_missing_variable() {
        let err = resolve_request(&templated_request(), &vars(), ResolutionPolicy::ThrowError)
            .unwrap_err();
        assert_eq!(
            err,
            ResolveError::Unresolved {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn form_fields_are_resolved() {
        let request = RequestSpec::get("form", "{{base_url}}").with_body(RequestBody::UrlEncoded {
            fields: vec![FormField::new("{{user}}", "{{token}}")],
        });
        let resolved = resolve_request(&request, &vars(), ResolutionPolicy::LeaveAsIs).unwrap();

        assert_eq!(
            resolved.body,
            RequestBody::UrlEncoded {
                fields: vec![FormField::new("ada", "abc123")]
            }
        );
    }

    #[tokio::test]
    async fn async_form_uses_scope_precedence() {
        let scopes = VariableScopes::new()
            .with_environment(vars())
            .with_global(
                [("user", "global-user"), ("missing", "from-global")]
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            );
        let ctx = ResolutionContext::new(scopes);

        let resolved =
            resolve_request_async(&templated_request(), &ctx, ResolutionPolicy::ThrowError)
                .await
                .unwrap();

        assert_eq!(resolved.url, "https://api.example.com/users/ada");
        assert_eq!(resolved.query_params[0].value, "from-global");
    }
}
