//! HTTP Request body types

use serde::{Deserialize, Serialize};

/// One field of a form body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Field name
    pub key: String,
    /// Field value
    pub value: String,
    /// Whether this field is sent
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_enabled() -> bool {
    true
}

impl FormField {
    /// Creates a new enabled form field.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            enabled: true,
        }
    }
}

/// HTTP request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestBody {
    /// No body
    #[default]
    None,
    /// Raw text/JSON body
    Raw {
        /// The content type (e.g., "application/json", "text/plain")
        content_type: String,
        /// The body text
        content: String,
    },
    /// `application/x-www-form-urlencoded` fields
    UrlEncoded {
        /// Ordered form fields
        fields: Vec<FormField>,
    },
    /// `multipart/form-data` text fields
    Multipart {
        /// Ordered form fields
        fields: Vec<FormField>,
    },
}

impl RequestBody {
    /// Creates a JSON body.
    #[must_use]
    pub fn json(content: impl Into<String>) -> Self {
        Self::Raw {
            content_type: "application/json".to_string(),
            content: content.into(),
        }
    }

    /// Creates a plain text body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Raw {
            content_type: "text/plain".to_string(),
            content: content.into(),
        }
    }

    /// Creates a url-encoded form body.
    #[must_use]
    pub fn url_encoded(fields: impl IntoIterator<Item = FormField>) -> Self {
        Self::UrlEncoded {
            fields: fields.into_iter().collect(),
        }
    }

    /// Returns whether the body carries no content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Raw { content, .. } => content.is_empty(),
            Self::UrlEncoded { fields } | Self::Multipart { fields } => fields.is_empty(),
        }
    }

    /// Returns the content type if applicable.
    ///
    /// Multipart bodies return `None`: the boundary is chosen by the transport.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        match self {
            Self::None | Self::Multipart { .. } => None,
            Self::Raw { content_type, .. } => Some(content_type),
            Self::UrlEncoded { .. } => Some("application/x-www-form-urlencoded"),
        }
    }
}
