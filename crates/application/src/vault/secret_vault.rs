//! Secret lookup backed by an encrypted store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, warn};

use courier_domain::DomainError;
use courier_domain::environment::{Secret, SecretType};

use super::{CipherError, VaultSession};
use crate::ports::{Clock, SecretLookup, SecretStore, SecretStoreError};

/// Errors from vault writes.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Encryption failed or the vault is locked.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    /// The secret store failed.
    #[error(transparent)]
    Store(#[from] SecretStoreError),

    /// The secret record is invalid.
    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Resolves `{{vault:name}}` references by decrypting stored secrets.
pub struct SecretVault<S: SecretStore, C: Clock> {
    store: Arc<S>,
    session: Arc<VaultSession>,
    clock: Arc<C>,
}

impl<S: SecretStore, C: Clock> SecretVault<S, C> {
    /// Creates a vault over a store and a session.
    pub const fn new(store: Arc<S>, session: Arc<VaultSession>, clock: Arc<C>) -> Self {
        Self {
            store,
            session,
            clock,
        }
    }

    /// Returns the session this vault decrypts with.
    #[must_use]
    pub const fn session(&self) -> &Arc<VaultSession> {
        &self.session
    }

    /// Encrypts `plaintext` and saves it under `name`, replacing any secret
    /// of that name while keeping its id and creation time.
    ///
    /// # Errors
    /// Fails with `CipherError::Locked` when the session is locked, or with
    /// the store error if persistence fails.
    pub async fn store_secret(
        &self,
        name: &str,
        secret_type: SecretType,
        plaintext: &str,
        tags: Vec<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Secret, VaultError> {
        let encrypted = self.session.encrypt(plaintext)?;
        let now = self.clock.now();

        let secret = match self.store.get_by_name(name).await? {
            Some(existing) => Secret {
                secret_type,
                encrypted_value: encrypted,
                tags,
                expires_at,
                updated_at: now,
                ..existing
            },
            None => Secret::new(name, secret_type, encrypted, now)?
                .with_tags(tags)
                .with_expiry(expires_at),
        };

        self.store.save(&secret).await?;
        debug!(secret = %name, "secret stored");
        Ok(secret)
    }
}

#[async_trait]
impl<S: SecretStore, C: Clock> SecretLookup for SecretVault<S, C> {
    fn is_unlocked(&self) -> bool {
        self.session.is_unlocked()
    }

    async fn get_secret_value(&self, name: &str) -> Option<String> {
        if !self.session.is_unlocked() {
            return None;
        }

        let secret = match self.store.get_by_name(name).await {
            Ok(Some(secret)) => secret,
            Ok(None) => return None,
            Err(e) => {
                warn!(secret = %name, error = %e, "secret lookup failed");
                return None;
            }
        };

        let now = self.clock.now();
        if secret.is_expired(now) {
            debug!(secret = %name, "secret expired");
            return None;
        }

        let value = match self.session.decrypt(&secret.encrypted_value) {
            Ok(Some(value)) => value,
            Ok(None) => {
                warn!(secret = %name, "secret failed to decrypt");
                return None;
            }
            Err(_) => return None,
        };

        if let Err(e) = self.store.touch(name, now).await {
            warn!(secret = %name, error = %e, "failed to record secret usage");
        }

        Some(value)
    }
}
