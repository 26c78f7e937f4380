// src/core/crypto/envelope.rs
//! Versioned authenticated-ciphertext wire format
//!
//! One envelope wraps one whole payload (the serialized item collection or
//! the vault verifier). Byte fields travel as base64 inside a JSON object.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::consts::{ENVELOPE_IV_BYTES, ENVELOPE_TAG_BYTES, ENVELOPE_VERSION};
use crate::error::EngineError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub version: u32,
    pub iv: String,
    pub tag: String,
    pub ciphertext: String,
}

impl Envelope {
    pub fn new(iv: &[u8], tag: &[u8], ciphertext: &[u8]) -> Self {
        Self {
            version: ENVELOPE_VERSION,
            iv: STANDARD.encode(iv),
            tag: STANDARD.encode(tag),
            ciphertext: STANDARD.encode(ciphertext),
        }
    }

    pub fn to_json(&self) -> Result<String, EngineError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an envelope, rejecting anything that is not well-formed JSON
    /// with the expected version and field shapes.
    pub fn from_json(payload: &str) -> Result<Self, EngineError> {
        let envelope: Envelope =
            serde_json::from_str(payload).map_err(|_| EngineError::FormatError)?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(EngineError::FormatError);
        }
        Ok(envelope)
    }

    /// Decode the byte fields, enforcing IV and tag sizes.
    pub fn decode_parts(&self) -> Result<(Vec<u8>, Vec<u8>, Vec<u8>), EngineError> {
        let iv = STANDARD
            .decode(&self.iv)
            .map_err(|_| EngineError::FormatError)?;
        let tag = STANDARD
            .decode(&self.tag)
            .map_err(|_| EngineError::FormatError)?;
        let ciphertext = STANDARD
            .decode(&self.ciphertext)
            .map_err(|_| EngineError::FormatError)?;
        if iv.len() != ENVELOPE_IV_BYTES || tag.len() != ENVELOPE_TAG_BYTES {
            return Err(EngineError::FormatError);
        }
        Ok((iv, tag, ciphertext))
    }
}
