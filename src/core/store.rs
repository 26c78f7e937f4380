// src/core/store.rs
//! ItemStore — CRUD over the snippet collection
//!
//! The whole collection lives in one document file. Every mutation is a
//! read-modify-write of the entire document under the document mutex, and
//! every write goes through a temp file + rename so a failed save never
//! leaves a partial document behind.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::aliases::VaultKey32;
use crate::config::journal_path;
use crate::consts::ENVELOPE_VERSION;
use crate::core::crypto::{decrypt_payload, encrypt_payload};
use crate::core::vault::VaultManager;
use crate::enums::DataMode;
use crate::error::EngineError;

type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub text: String,
    pub updated_at: DateTime<Utc>,
}

/// Encrypted-mode document: `{ "version": 1, "encrypted": "<envelope JSON>" }`
#[derive(Debug, Serialize, Deserialize)]
struct DocumentWrapper {
    version: u32,
    encrypted: String,
}

/// Opaque, roughly time-ordered item id: unix millis plus a random suffix.
pub fn new_item_id() -> String {
    let mut suffix = [0u8; 3];
    rand::rng().fill_bytes(&mut suffix);
    format!("{}-{}", Utc::now().timestamp_millis(), hex::encode(suffix))
}

pub struct ItemStore {
    data_path: PathBuf,
    doc_lock: Arc<Mutex<()>>,
}

impl ItemStore {
    pub fn new(data_path: PathBuf, doc_lock: Arc<Mutex<()>>) -> Self {
        Self {
            data_path,
            doc_lock,
        }
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn set_data_path(&mut self, data_path: PathBuf) {
        self.data_path = data_path;
    }

    fn locked(&self) -> MutexGuard<'_, ()> {
        self.doc_lock.lock().expect("document lock poisoned")
    }

    pub fn load(&self, mode: DataMode, vault: &VaultManager) -> Result<Vec<Item>> {
        let _guard = self.locked();
        self.load_inner(mode, vault)
    }

    pub fn save(&self, items: &[Item], mode: DataMode, vault: &VaultManager) -> Result<()> {
        let _guard = self.locked();
        self.save_inner(items, mode, vault)
    }

    /// Create the document if missing: encrypted empty array when the mode
    /// and vault allow it, plain `[]` otherwise.
    pub fn ensure_document(&self, mode: DataMode, vault: &VaultManager) -> Result<()> {
        let _guard = self.locked();
        self.ensure_inner(mode, vault)
    }

    pub fn create(&self, text: &str, mode: DataMode, vault: &VaultManager) -> Result<(Item, Vec<Item>)> {
        let text = valid_text(text)?;
        let _guard = self.locked();
        let mut items = self.load_inner(mode, vault)?;
        let item = Item {
            id: new_item_id(),
            text,
            updated_at: Utc::now(),
        };
        items.insert(0, item.clone());
        self.save_inner(&items, mode, vault)?;
        Ok((item, items))
    }

    pub fn update(&self, id: &str, text: &str, mode: DataMode, vault: &VaultManager) -> Result<(Item, Vec<Item>)> {
        let text = valid_text(text)?;
        let _guard = self.locked();
        let mut items = self.load_inner(mode, vault)?;
        let slot = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_owned()))?;
        slot.text = text;
        slot.updated_at = Utc::now();
        let item = slot.clone();
        self.save_inner(&items, mode, vault)?;
        Ok((item, items))
    }

    /// Idempotent: deleting an id that does not exist is a successful no-op.
    pub fn delete(&self, id: &str, mode: DataMode, vault: &VaultManager) -> Result<Vec<Item>> {
        let _guard = self.locked();
        let mut items = self.load_inner(mode, vault)?;
        items.retain(|item| item.id != id);
        self.save_inner(&items, mode, vault)?;
        Ok(items)
    }

    pub fn get(&self, id: &str, mode: DataMode, vault: &VaultManager) -> Result<Item> {
        let _guard = self.locked();
        let items = self.load_inner(mode, vault)?;
        items
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| EngineError::NotFound(id.to_owned()))
    }

    fn load_inner(&self, mode: DataMode, vault: &VaultManager) -> Result<Vec<Item>> {
        self.ensure_inner(mode, vault)?;
        let raw = fs::read_to_string(&self.data_path)?;

        if mode == DataMode::Plaintext {
            return Ok(parse_plain_items(&raw).unwrap_or_default());
        }

        vault.require_unlocked(mode)?;

        // Interrupted mode migration: the flag says Encrypted but the bytes
        // are still a plaintext array. Re-encrypt in place and carry on.
        if let Some(items) = parse_plain_items(&raw) {
            self.save_inner(&items, mode, vault)?;
            return Ok(items);
        }

        let wrapper: DocumentWrapper = match serde_json::from_str(&raw) {
            Ok(wrapper) => wrapper,
            Err(_) => return Ok(Vec::new()),
        };
        if wrapper.version != ENVELOPE_VERSION || wrapper.encrypted.is_empty() {
            return Ok(Vec::new());
        }

        let key = vault.session_key()?;
        let plain = decrypt_payload(&wrapper.encrypted, key.expose_secret())
            .map_err(|_| EngineError::DecryptionFailure)?;
        let value: serde_json::Value =
            serde_json::from_slice(&plain).map_err(|_| EngineError::DecryptionFailure)?;
        Ok(serde_json::from_value(value).unwrap_or_default())
    }

    fn save_inner(&self, items: &[Item], mode: DataMode, vault: &VaultManager) -> Result<()> {
        let body = serde_json::to_string_pretty(items)?;
        let bytes = match mode {
            DataMode::Plaintext => body,
            DataMode::Encrypted => {
                vault.require_unlocked(mode)?;
                let key = vault.session_key()?;
                self.wrap_document(body.as_bytes(), key)?
            }
        };
        self.write_document(bytes.as_bytes())
    }

    fn ensure_inner(&self, mode: DataMode, vault: &VaultManager) -> Result<()> {
        if let Some(parent) = self.data_path.parent() {
            fs::create_dir_all(parent)?;
        }
        if self.data_path.exists() {
            return Ok(());
        }
        if mode == DataMode::Encrypted && vault.is_configured() && vault.is_unlocked() {
            let wrapped = self.wrap_document(b"[]", vault.session_key()?)?;
            return self.write_document(wrapped.as_bytes());
        }
        self.write_document(b"[]")
    }

    fn wrap_document(&self, body: &[u8], key: &VaultKey32) -> Result<String> {
        let encrypted = encrypt_payload(body, key.expose_secret())?;
        Ok(serde_json::to_string_pretty(&DocumentWrapper {
            version: ENVELOPE_VERSION,
            encrypted,
        })?)
    }

    fn write_document(&self, bytes: &[u8]) -> Result<()> {
        let dir = self
            .data_path
            .parent()
            .ok_or_else(|| EngineError::Config("data path has no parent".into()))?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.data_path)
            .map_err(|err| EngineError::Io(err.error))?;
        Ok(())
    }

    /// Rotation support: write the document re-encrypted under `key` to the
    /// journal path without touching the live file.
    pub fn write_rotation_journal(&self, items: &[Item], key: &VaultKey32) -> Result<PathBuf> {
        let _guard = self.locked();
        let body = serde_json::to_string_pretty(items)?;
        let wrapped = self.wrap_document(body.as_bytes(), key)?;
        let journal = journal_path(&self.data_path);
        fs::write(&journal, wrapped)?;
        Ok(journal)
    }
}

fn valid_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("text cannot be empty".into()));
    }
    Ok(trimmed.to_owned())
}

/// Accept a raw JSON array of items; anything else is not plaintext data.
fn parse_plain_items(raw: &str) -> Option<Vec<Item>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}
