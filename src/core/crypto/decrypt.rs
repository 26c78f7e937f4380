// src/core/crypto/decrypt.rs
use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};

use crate::error::EngineError;

use super::envelope::Envelope;

/// Decrypt an envelope JSON string under a 256-bit key.
///
/// `FormatError` means the envelope itself is malformed. `DecryptionFailure`
/// means tag verification failed — a wrong key and corrupted ciphertext are
/// deliberately indistinguishable here.
pub fn decrypt_payload(payload: &str, key: &[u8; 32]) -> Result<Vec<u8>, EngineError> {
    let envelope = Envelope::from_json(payload)?;
    let (iv, tag, ciphertext) = envelope.decode_parts()?;

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| EngineError::Crypto("invalid AES-256 key length".into()))?;

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);

    cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_slice())
        .map_err(|_| EngineError::DecryptionFailure)
}
