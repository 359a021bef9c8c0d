//! HTTP request body builder.
//!
//! Converts the domain `RequestBody` into a transport body. Disabled form
//! fields are dropped here, so the domain model can keep them around for
//! editing without sending them.

use reqwest::multipart::Form;

use courier_domain::request::{FormField, RequestBody};

/// Error type for body building operations.
#[derive(Debug, thiserror::Error)]
pub enum BodyBuildError {
    /// The form fields could not be encoded.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Encoder message.
        message: String,
    },
}

/// Result of building a body.
pub enum BuiltBody {
    /// No body.
    None,
    /// Text body with the content type it should be sent with.
    Text {
        /// Body text.
        content: String,
        /// Value for the `Content-Type` header.
        content_type: String,
    },
    /// Multipart form data. reqwest picks the boundary and the header.
    Multipart(Form),
}

impl std::fmt::Debug for BuiltBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Text {
                content,
                content_type,
            } => f
                .debug_struct("Text")
                .field("content", content)
                .field("content_type", content_type)
                .finish(),
            Self::Multipart(_) => f.write_str("Multipart(..)"),
        }
    }
}

/// Build a transport body from a resolved request body.
///
/// # Errors
///
/// Returns `BodyBuildError::Serialization` if url-encoding fails.
pub fn build_body(body: &RequestBody) -> Result<BuiltBody, BodyBuildError> {
    match body {
        RequestBody::None => Ok(BuiltBody::None),

        RequestBody::Raw {
            content_type,
            content,
        } => Ok(BuiltBody::Text {
            content: content.clone(),
            content_type: content_type.clone(),
        }),

        RequestBody::UrlEncoded { fields } => {
            let pairs: Vec<(&str, &str)> = enabled(fields)
                .map(|f| (f.key.as_str(), f.value.as_str()))
                .collect();
            let encoded = serde_urlencoded::to_string(pairs).map_err(|e| {
                BodyBuildError::Serialization {
                    message: e.to_string(),
                }
            })?;
            Ok(BuiltBody::Text {
                content: encoded,
                content_type: "application/x-www-form-urlencoded".to_string(),
            })
        }

        RequestBody::Multipart { fields } => {
            let form = enabled(fields).fold(Form::new(), |form, field| {
                form.text(field.key.clone(), field.value.clone())
            });
            Ok(BuiltBody::Multipart(form))
        }
    }
}

fn enabled(fields: &[FormField]) -> impl Iterator<Item = &FormField> {
    fields.iter().filter(|f| f.enabled)
}
