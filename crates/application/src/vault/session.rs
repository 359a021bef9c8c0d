//! Vault session: the explicitly owned "key is loaded" state
//!
//! `Locked →(set_key)→ Unlocked →(clear_key)→ Locked`

use std::sync::{PoisonError, RwLock};

use tracing::debug;

use super::cipher::{self, CipherError, KeyBytes};

/// Holds the vault key while unlocked.
///
/// Share it behind an `Arc`; every method takes `&self`.
#[derive(Default)]
pub struct VaultSession {
    key: RwLock<Option<KeyBytes>>,
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("unlocked", &self.is_unlocked())
            .finish()
    }
}

impl VaultSession {
    /// Creates a locked session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a base64 key, replacing any key already loaded.
    ///
    /// # Errors
    /// Returns `CipherError::InvalidKey` if the key is not base64 of 32 bytes.
    pub fn set_key(&self, key: &str) -> Result<(), CipherError> {
        let bytes = cipher::decode_key(key)?;
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
        debug!("vault unlocked");
        Ok(())
    }

    /// Loads a key only if it matches a stored verification token.
    ///
    /// # Errors
    /// Returns `CipherError::InvalidKey` if the key does not verify.
    pub fn unlock(&self, key: &str, verification_token: &str) -> Result<(), CipherError> {
        if !cipher::verify_key(key, verification_token) {
            return Err(CipherError::InvalidKey);
        }
        self.set_key(key)
    }

    /// Wipes and drops the loaded key.
    pub fn clear_key(&self) {
        // Zeroizing overwrites the bytes when the old value drops.
        let previous = self.key.write().unwrap_or_else(PoisonError::into_inner).take();
        drop(previous);
        debug!("vault locked");
    }

    /// Returns true while a key is loaded.
    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Encrypts under the loaded key.
    ///
    /// # Errors
    /// Returns `CipherError::Locked` when no key is loaded.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CipherError> {
        let guard = self.key.read().unwrap_or_else(PoisonError::into_inner);
        let key = guard.as_ref().ok_or(CipherError::Locked)?;
        cipher::encrypt_with_key(key, plaintext)
    }

    /// Decrypts under the loaded key. `Ok(None)` means the blob did not
    /// authenticate.
    ///
    /// # Errors
    /// Returns `CipherError::Locked` when no key is loaded.
    pub fn decrypt(&self, blob: &str) -> Result<Option<String>, CipherError> {
        let guard = self.key.read().unwrap_or_else(PoisonError::into_inner);
        let key = guard.as_ref().ok_or(CipherError::Locked)?;
        Ok(cipher::decrypt_with_key(key, blob))
    }
}
