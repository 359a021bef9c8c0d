//! Encrypted secret vault
//!
//! - [`cipher`]: stateless AES-256-GCM and key-verification primitives
//! - [`VaultSession`]: the one place a decryption key lives while unlocked
//! - [`SecretVault`]: secret lookup over a [`SecretStore`](crate::ports::SecretStore)

pub mod cipher;
mod secret_vault;
mod session;

pub use cipher::{
    CipherError, create_verification_token, decrypt_with_key, encrypt_with_key, generate_key,
    verify_key,
};
pub use secret_vault::{SecretVault, VaultError};
pub use session::VaultSession;
