// src/secrets.rs
//! Access-token sealing — platform keychain + envelope encryption
//!
//! The PAT itself never sits in the keychain or in the settings file in the
//! clear: a random per-device key lives in the platform keychain, and the
//! settings file carries the token wrapped in the same envelope format the
//! vault uses. Unsealing happens transiently per git invocation.

use keyring::Entry;

use crate::aliases::{AccessToken, DeviceKey32, SecureConversionsExt, SecureRandomExt};
use crate::consts::{KEYCHAIN_SERVICE, KEYCHAIN_USER};
use crate::core::crypto::{decrypt_payload, encrypt_payload};
use crate::error::EngineError;

type Result<T> = std::result::Result<T, EngineError>;

pub struct TokenGuard {
    key: DeviceKey32,
}

impl TokenGuard {
    /// Load the device key from the platform keychain, creating it on first
    /// use.
    pub fn from_platform() -> Result<Self> {
        let entry = Entry::new(KEYCHAIN_SERVICE, KEYCHAIN_USER)
            .map_err(|err| EngineError::Keychain(err.to_string()))?;
        let stored = match entry.get_password() {
            Ok(stored) => stored,
            Err(keyring::Error::NoEntry) => {
                let key = DeviceKey32::random();
                let encoded = key.to_hex();
                entry
                    .set_password(&encoded)
                    .map_err(|err| EngineError::Keychain(err.to_string()))?;
                return Ok(Self { key });
            }
            Err(err) => return Err(EngineError::Keychain(err.to_string())),
        };
        let bytes: [u8; 32] = hex::decode(&stored)
            .ok()
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or_else(|| EngineError::Keychain("stored device key is malformed".into()))?;
        Ok(Self {
            key: DeviceKey32::new(bytes),
        })
    }

    /// Explicit key, for tests and headless environments.
    pub fn with_key(key: [u8; 32]) -> Self {
        Self {
            key: DeviceKey32::new(key),
        }
    }

    pub fn seal(&self, token: &str) -> Result<String> {
        encrypt_payload(token.as_bytes(), self.key.expose_secret())
    }

    pub fn open(&self, sealed: &str) -> Result<AccessToken> {
        let bytes = decrypt_payload(sealed, self.key.expose_secret())?;
        let token = String::from_utf8(bytes).map_err(|_| EngineError::FormatError)?;
        Ok(AccessToken::new(token))
    }
}
