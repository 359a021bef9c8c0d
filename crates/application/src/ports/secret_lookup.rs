//! Secret lookup port used by the template resolver

use async_trait::async_trait;

/// Read access to decrypted secret values.
#[async_trait]
pub trait SecretLookup: Send + Sync {
    /// Returns true when a key is loaded and values can be decrypted.
    fn is_unlocked(&self) -> bool;

    /// Returns the plaintext of a secret, or `None` when it cannot be produced.
    async fn get_secret_value(&self, name: &str) -> Option<String>;
}
