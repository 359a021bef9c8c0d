//! Encrypted secret records

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Kind of value a secret holds. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretType {
    /// An API key.
    ApiKey,
    /// A bearer or refresh token.
    Token,
    /// A password.
    Password,
    /// A certificate or private key in PEM form.
    Certificate,
    /// Anything else.
    #[default]
    Generic,
}

impl SecretType {
    /// Returns the wire tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiKey => "api_key",
            Self::Token => "token",
            Self::Password => "password",
            Self::Certificate => "certificate",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretType {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s {
            "api_key" => Ok(Self::ApiKey),
            "token" => Ok(Self::Token),
            "password" => Ok(Self::Password),
            "certificate" => Ok(Self::Certificate),
            "generic" => Ok(Self::Generic),
            other => Err(DomainError::UnknownSecretType(other.to_string())),
        }
    }
}

/// A secret as stored at rest. `encrypted_value` is the base64 blob
/// `nonce(12) ‖ ciphertext ‖ tag(16)`; plaintext never lives here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Secret {
    /// Unique identifier.
    pub id: Uuid,
    /// Lookup name, unique within the vault.
    pub name: String,
    /// Kind of value.
    #[serde(rename = "type", default)]
    pub secret_type: SecretType,
    /// Base64 ciphertext blob.
    pub encrypted_value: String,
    /// Free-form labels.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// After this instant the secret no longer resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    /// Last time the secret was resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Secret {
    /// Creates a secret record from an already encrypted blob.
    pub fn new(
        name: impl Into<String>,
        secret_type: SecretType,
        encrypted_value: impl Into<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::InvalidIdentifier(
                "secret name must not be empty".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            name,
            secret_type,
            encrypted_value: encrypted_value.into(),
            tags: Vec::new(),
            expires_at: None,
            last_used_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets tags (builder form).
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Sets the expiry (builder form).
    #[must_use]
    pub const fn with_expiry(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    /// Returns true once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| now >= expiry)
    }
}
