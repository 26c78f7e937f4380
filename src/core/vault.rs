// src/core/vault.rs
//! VaultManager — owns the in-memory session key and its lifecycle
//!
//! States: Unconfigured → Unlocked (setup), Configured&Locked → Unlocked
//! (unlock), and back to Locked on `lock()`. The session key exists only in
//! process memory while unlocked; it is cleared on lock and on any failed
//! setup or unlock, and it never reaches settings, logs or sync payloads.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;

use crate::aliases::VaultKey32;
use crate::config::VaultSettings;
use crate::consts::VAULT_VERIFIER_PLAINTEXT;
use crate::core::crypto::{decrypt_payload, derive_key, encrypt_payload, generate_salt};
use crate::enums::DataMode;
use crate::error::EngineError;

type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct VaultStatus {
    pub configured: bool,
    pub unlocked: bool,
}

/// Everything a password rotation needs to commit: the replacement salt,
/// verifier, and derived key. Built up front so the document can be
/// re-encrypted before anything is persisted.
pub struct RotationPlan {
    salt: String,
    verifier: String,
    key: VaultKey32,
}

impl RotationPlan {
    pub fn key(&self) -> &VaultKey32 {
        &self.key
    }

    pub fn vault_settings(&self) -> VaultSettings {
        VaultSettings {
            salt: self.salt.clone(),
            verifier: self.verifier.clone(),
        }
    }
}

pub struct VaultManager {
    salt: String,
    verifier: String,
    session: Option<VaultKey32>,
}

impl VaultManager {
    pub fn from_settings(settings: &VaultSettings) -> Self {
        Self {
            salt: settings.salt.clone(),
            verifier: settings.verifier.clone(),
            session: None,
        }
    }

    pub fn vault_settings(&self) -> VaultSettings {
        VaultSettings {
            salt: self.salt.clone(),
            verifier: self.verifier.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.salt.is_empty() && !self.verifier.is_empty()
    }

    pub fn is_unlocked(&self) -> bool {
        self.session.is_some()
    }

    pub fn status(&self) -> VaultStatus {
        VaultStatus {
            configured: self.is_configured(),
            unlocked: self.is_unlocked(),
        }
    }

    /// Central gate for document access: in Encrypted mode the vault must be
    /// set up and unlocked. Plaintext mode needs neither.
    pub fn require_unlocked(&self, mode: DataMode) -> Result<()> {
        if mode != DataMode::Encrypted {
            return Ok(());
        }
        if !self.is_configured() {
            return Err(EngineError::NotConfigured);
        }
        if !self.is_unlocked() {
            return Err(EngineError::Locked);
        }
        Ok(())
    }

    pub fn session_key(&self) -> Result<&VaultKey32> {
        self.session.as_ref().ok_or(EngineError::Locked)
    }

    /// First-time vault setup. Generates a salt, derives the key, and
    /// encrypts the fixed verifier. The caller persists the returned
    /// settings; on any failure the session stays cleared.
    pub fn setup(&mut self, password: &str) -> Result<()> {
        if self.is_configured() {
            return Err(EngineError::AlreadyConfigured);
        }
        let salt = generate_salt();
        let key = derive_key(password, &salt)?;
        match encrypt_payload(VAULT_VERIFIER_PLAINTEXT.as_bytes(), key.expose_secret()) {
            Ok(verifier) => {
                self.salt = STANDARD.encode(salt);
                self.verifier = verifier;
                self.session = Some(key);
                Ok(())
            }
            Err(err) => {
                self.session = None;
                Err(err)
            }
        }
    }

    /// Unlock with the stored salt and verifier. Any mismatch — wrong
    /// password, tampered verifier — reads as `IncorrectPassword`.
    pub fn unlock(&mut self, password: &str) -> Result<()> {
        self.session = None;
        let key = self.verify_password(password)?;
        self.session = Some(key);
        Ok(())
    }

    pub fn lock(&mut self) {
        self.session = None;
    }

    /// Derive and check a password against the stored verifier without
    /// changing the session.
    fn verify_password(&self, password: &str) -> Result<VaultKey32> {
        if !self.is_configured() {
            return Err(EngineError::NotConfigured);
        }
        let salt = STANDARD
            .decode(&self.salt)
            .map_err(|_| EngineError::FormatError)?;
        let key = derive_key(password, &salt)?;
        let plain = decrypt_payload(&self.verifier, key.expose_secret())
            .map_err(|_| EngineError::IncorrectPassword)?;
        if plain != VAULT_VERIFIER_PLAINTEXT.as_bytes() {
            return Err(EngineError::IncorrectPassword);
        }
        Ok(key)
    }

    /// Stage a password change: prove the old password (unlocking the
    /// session with it, so the document can still be read), then derive the
    /// replacement salt, key, and verifier. Nothing is persisted here — the
    /// engine commits the plan together with the re-encrypted document.
    pub fn prepare_rotation(&mut self, old_password: &str, new_password: &str) -> Result<RotationPlan> {
        let old_key = self.verify_password(old_password)?;
        self.session = Some(old_key);

        let salt = generate_salt();
        let key = derive_key(new_password, &salt)?;
        let verifier = encrypt_payload(VAULT_VERIFIER_PLAINTEXT.as_bytes(), key.expose_secret())?;
        Ok(RotationPlan {
            salt: STANDARD.encode(salt),
            verifier,
            key,
        })
    }

    /// Adopt a committed rotation: replace salt and verifier, keep the
    /// session unlocked under the new key.
    pub fn apply_rotation(&mut self, plan: RotationPlan) {
        self.salt = plan.salt;
        self.verifier = plan.verifier;
        self.session = Some(plan.key);
    }
}
