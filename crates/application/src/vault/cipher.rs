//! AES-256-GCM secret encryption and key verification
//!
//! At-rest layout of an encrypted value, base64 encoded:
//!
//! ```text
//! nonce (12 bytes) ‖ ciphertext (n bytes) ‖ tag (16 bytes)
//! ```
//!
//! Keys travel as base64 of exactly 32 bytes. Verification tokens are
//! `base64(salt) ":" base64(HMAC-SHA-256(key, salt))` with a 16-byte salt.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// Key length in bytes (256 bits).
pub const KEY_LEN: usize = 32;
/// Nonce length in bytes (96 bits).
pub const NONCE_LEN: usize = 12;
/// Authentication tag length in bytes.
pub const TAG_LEN: usize = 16;
/// Verification salt length in bytes (128 bits).
pub const SALT_LEN: usize = 16;

/// Errors raised by cipher operations.
///
/// Authentication failures during decryption are not errors; they yield
/// `None`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CipherError {
    /// No key is loaded in the session.
    #[error("vault is locked")]
    Locked,

    /// The key is not base64 of exactly 32 bytes.
    #[error("invalid vault key")]
    InvalidKey,

    /// The AEAD primitive refused to encrypt.
    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Raw key bytes, wiped on drop.
pub(crate) type KeyBytes = Zeroizing<[u8; KEY_LEN]>;

/// Generates a random 256-bit key, base64 encoded.
#[must_use]
pub fn generate_key() -> String {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    rand::rng().fill_bytes(&mut key[..]);
    STANDARD.encode(&key[..])
}

/// Decodes a base64 key, rejecting anything that is not exactly 32 bytes.
pub(crate) fn decode_key(key: &str) -> Result<KeyBytes, CipherError> {
    let decoded = Zeroizing::new(
        STANDARD
            .decode(key.trim())
            .map_err(|_| CipherError::InvalidKey)?,
    );
    if decoded.len() != KEY_LEN {
        return Err(CipherError::InvalidKey);
    }

    let mut bytes = Zeroizing::new([0u8; KEY_LEN]);
    bytes.copy_from_slice(&decoded);
    Ok(bytes)
}

fn keyed_mac(key: &[u8; KEY_LEN], salt: &[u8]) -> Result<HmacSha256, CipherError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(key).map_err(|_| CipherError::InvalidKey)?;
    mac.update(salt);
    Ok(mac)
}

/// Creates a token that later proves a key is the one it was made from.
///
/// # Errors
/// Returns `CipherError::InvalidKey` if the key does not decode.
pub fn create_verification_token(key: &str) -> Result<String, CipherError> {
    let key = decode_key(key)?;

    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);

    let hash = keyed_mac(&key, &salt)?.finalize().into_bytes();
    Ok(format!("{}:{}", STANDARD.encode(salt), STANDARD.encode(hash)))
}

/// Checks a key against a verification token in constant time.
///
/// Any malformed key or token yields `false`.
#[must_use]
pub fn verify_key(key: &str, token: &str) -> bool {
    let Ok(key) = decode_key(key) else {
        return false;
    };
    let Some((salt, hash)) = token.split_once(':') else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(hash)) else {
        return false;
    };
    let Ok(mac) = keyed_mac(&key, &salt) else {
        return false;
    };

    let actual = mac.finalize().into_bytes();
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

/// Encrypts `plaintext` under `key` with a fresh random nonce.
///
/// # Errors
/// Returns `CipherError::Encryption` if the AEAD primitive fails.
pub fn encrypt_with_key(key: &[u8; KEY_LEN], plaintext: &str) -> Result<String, CipherError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| CipherError::InvalidKey)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|e| CipherError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(blob))
}

/// Decrypts a blob produced by [`encrypt_with_key`].
///
/// Returns `None` when the blob is corrupt, was made with another key, or
/// was tampered with.
#[must_use]
pub fn decrypt_with_key(key: &[u8; KEY_LEN], blob: &str) -> Option<String> {
    let data = STANDARD.decode(blob.trim()).ok()?;
    if data.len() < NONCE_LEN + TAG_LEN {
        return None;
    }

    let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
    let cipher = Aes256Gcm::new_from_slice(key).ok()?;
    let plaintext = Zeroizing::new(cipher.decrypt(Nonce::from_slice(nonce_bytes), ciphertext).ok()?);

    String::from_utf8(plaintext.to_vec()).ok()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fresh_key() -> (String, KeyBytes) {
        let encoded = generate_key();
        let bytes = decode_key(&encoded).unwrap();
        (encoded, bytes)
    }

    #[test]
    fn generated_key_is_32_bytes() {
        let encoded = generate_key();
        assert_eq!(STANDARD.decode(&encoded).unwrap().len(), KEY_LEN);
        assert_ne!(encoded, generate_key());
    }

    #[test]
    fn decode_key_rejects_wrong_length() {
        let short = STANDARD.encode([7u8; 16]);
        assert_eq!(decode_key(&short).unwrap_err(), CipherError::InvalidKey);
        assert_eq!(decode_key("not base64!").unwrap_err(), CipherError::InvalidKey);
    }

    #[test]
    fn encrypt_then_decrypt_returns_plaintext() {
        let (_, key) = fresh_key();
        for plaintext in ["", "s3cr3t", "ünïcødé 🔐"] {
            let blob = encrypt_with_key(&key, plaintext).unwrap();
            assert_eq!(decrypt_with_key(&key, &blob).as_deref(), Some(plaintext));
        }
    }

    #[test]
    fn same_plaintext_encrypts_differently() {
        let (_, key) = fresh_key();
        let a = encrypt_with_key(&key, "value").unwrap();
        let b = encrypt_with_key(&key, "value").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn blob_layout_is_nonce_ciphertext_tag() {
        let (_, key) = fresh_key();
        let blob = encrypt_with_key(&key, "abcd").unwrap();
        let raw = STANDARD.decode(blob).unwrap();
        assert_eq!(raw.len(), NONCE_LEN + 4 + TAG_LEN);
    }

    #[test]
    fn wrong_key_yields_none() {
        let (_, key) = fresh_key();
        let (_, other) = fresh_key();
        let blob = encrypt_with_key(&key, "secret").unwrap();
        assert_eq!(decrypt_with_key(&other, &blob), None);
    }

    #[test]
    fn tampered_blob_yields_none() {
        let (_, key) = fresh_key();
        let blob = encrypt_with_key(&key, "secret").unwrap();
        let mut raw = STANDARD.decode(blob).unwrap();
        let last = raw.len() - 1;
        raw[last] ^= 0x01;
        assert_eq!(decrypt_with_key(&key, &STANDARD.encode(raw)), None);
    }

    #[test]
    fn short_or_garbage_blob_yields_none() {
        let (_, key) = fresh_key();
        assert_eq!(decrypt_with_key(&key, &STANDARD.encode([0u8; 27])), None);
        assert_eq!(decrypt_with_key(&key, "%%%"), None);
    }

    #[test]
    fn verification_token_matches_only_its_key() {
        let (encoded, _) = fresh_key();
        let (other, _) = fresh_key();
        let token = create_verification_token(&encoded).unwrap();

        assert!(verify_key(&encoded, &token));
        assert!(!verify_key(&other, &token));
    }

    #[test]
    fn verification_tokens_are_salted() {
        let (encoded, _) = fresh_key();
        let a = create_verification_token(&encoded).unwrap();
        let b = create_verification_token(&encoded).unwrap();
        assert_ne!(a, b);
        assert!(verify_key(&encoded, &b));
    }

    #[test]
    fn malformed_token_or_key_is_false() {
        let (encoded, _) = fresh_key();
        assert!(!verify_key(&encoded, "no-separator"));
        assert!(!verify_key(&encoded, "@@@:@@@"));
        assert!(!verify_key(&encoded, ":"));
        assert!(!verify_key("short", &create_verification_token(&encoded).unwrap()));
    }
}
