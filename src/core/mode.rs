// src/core/mode.rs
//! StorageModeController — migration between encrypted and plaintext storage
//!
//! Switching re-persists the whole document in the target encoding. The mode
//! flag flips before the rewrite, so a crash in between leaves the flag ahead
//! of the bytes; the legacy-plaintext fallback in the store recovers the
//! Encrypted direction on the next load.

use std::path::Path;

use crate::config::Settings;
use crate::core::store::{Item, ItemStore};
use crate::core::vault::VaultManager;
use crate::enums::DataMode;
use crate::error::EngineError;

type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug)]
pub struct ModeSwitch {
    pub mode: DataMode,
    pub items: Vec<Item>,
}

pub fn set_mode(
    target: DataMode,
    password: Option<&str>,
    settings: &mut Settings,
    settings_path: &Path,
    vault: &mut VaultManager,
    store: &ItemStore,
) -> Result<ModeSwitch> {
    let current = settings.security.data_mode;

    if target == current {
        // Idempotent: report current state, rewrite nothing.
        let items = if current == DataMode::Plaintext || vault.is_unlocked() {
            store.load(current, vault)?
        } else {
            Vec::new()
        };
        return Ok(ModeSwitch {
            mode: current,
            items,
        });
    }

    match target {
        DataMode::Plaintext => {
            if !vault.is_configured() {
                return Err(EngineError::NotConfigured);
            }
            if !vault.is_unlocked() {
                let password = password.ok_or(EngineError::PasswordRequired)?;
                vault.unlock(password)?;
            }
        }
        DataMode::Encrypted => {
            if !vault.is_configured() {
                let password = password.ok_or(EngineError::PasswordRequired)?;
                vault.setup(password)?;
                settings.vault = vault.vault_settings();
            } else if !vault.is_unlocked() {
                let password = password.ok_or(EngineError::PasswordRequired)?;
                vault.unlock(password)?;
            }
        }
    }

    let items = store.load(current, vault)?;
    settings.security.data_mode = target;
    settings.save(settings_path)?;
    store.save(&items, target, vault)?;

    Ok(ModeSwitch {
        mode: target,
        items,
    })
}
