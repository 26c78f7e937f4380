// src/core/crypto/derive.rs
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

use crate::aliases::VaultKey32;
use crate::consts::{VAULT_KEY_BYTES, VAULT_PBKDF2_ROUNDS, VAULT_SALT_BYTES};
use crate::error::EngineError;

/// Derive the 256-bit vault key from a password and stored salt.
///
/// Deterministic: the same (password, salt) pair always yields the same key,
/// which is what makes verifier-based unlock possible.
pub fn derive_key(password: &str, salt: &[u8]) -> Result<VaultKey32, EngineError> {
    if password.is_empty() {
        return Err(EngineError::InvalidInput(
            "vault password must not be empty".into(),
        ));
    }
    if salt.is_empty() {
        return Err(EngineError::InvalidInput("vault salt is invalid".into()));
    }
    let mut out = [0u8; VAULT_KEY_BYTES];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, VAULT_PBKDF2_ROUNDS, &mut out);
    Ok(VaultKey32::new(out))
}

/// Fresh random KDF salt.
pub fn generate_salt() -> [u8; VAULT_SALT_BYTES] {
    let mut salt = [0u8; VAULT_SALT_BYTES];
    rand::rng().fill_bytes(&mut salt);
    salt
}
