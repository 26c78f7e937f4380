// src/core/crypto/encrypt.rs
use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::Aes256Gcm;

use crate::consts::ENVELOPE_TAG_BYTES;
use crate::error::EngineError;

use super::envelope::Envelope;

/// Encrypt a payload under a 256-bit key, returning the envelope as a JSON
/// string. A fresh random 12-byte IV is drawn per call — never reused for a
/// given key.
pub fn encrypt_payload(plaintext: &[u8], key: &[u8; 32]) -> Result<String, EngineError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| EngineError::Crypto("invalid AES-256 key length".into()))?;
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|_| EngineError::Crypto("AES-GCM encryption failed".into()))?;

    // aes-gcm appends the 16-byte tag; the wire format keeps it separate
    let split = sealed.len() - ENVELOPE_TAG_BYTES;
    let envelope = Envelope::new(nonce.as_slice(), &sealed[split..], &sealed[..split]);
    envelope.to_json()
}
