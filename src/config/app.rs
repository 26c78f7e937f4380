// src/config/app.rs
//! Persisted application settings
//!
//! One TOML file holds everything the process remembers between runs:
//! git remote + sealed credential, storage root, data mode, vault salt and
//! verifier. Saves are atomic (temp file + rename). The session key is never
//! part of this file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::consts::{DATA_FILE, DATA_SUBDIR, REPO_DIR, ROTATE_JOURNAL_SUFFIX};
use crate::enums::DataMode;
use crate::error::EngineError;

type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// User-selected storage root; empty means the default location.
    pub storage_dir: String,
    pub git: GitSettings,
    pub security: SecuritySettings,
    pub vault: VaultSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    pub repo_url: String,
    pub branch: String,
    /// Access token wrapped by the device key; see `secrets::TokenGuard`.
    pub pat_sealed: String,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            repo_url: String::new(),
            branch: defaults::default_branch(),
            pat_sealed: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SecuritySettings {
    pub data_mode: DataMode,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VaultSettings {
    /// Base64 of the 16-byte KDF salt; empty until the vault is set up.
    pub salt: String,
    /// Envelope JSON of the encrypted verifier string.
    pub verifier: String,
}

impl Settings {
    /// Load settings, falling back to defaults when the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|err| EngineError::Config(err.to_string()))
    }

    /// Atomically replace the settings file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let serialized =
            toml::to_string_pretty(self).map_err(|err| EngineError::Config(err.to_string()))?;
        let dir = path
            .parent()
            .ok_or_else(|| EngineError::Config("settings path has no parent".into()))?;
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(serialized.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|err| EngineError::Io(err.error))?;
        Ok(())
    }

    /// Write these settings to the rotation journal next to `path` without
    /// touching the live file. Returns the journal path.
    pub fn write_journal(&self, path: &Path) -> Result<PathBuf> {
        let serialized =
            toml::to_string_pretty(self).map_err(|err| EngineError::Config(err.to_string()))?;
        let journal = journal_path(path);
        fs::write(&journal, serialized)?;
        Ok(journal)
    }

    pub fn is_git_configured(&self) -> bool {
        !self.git.repo_url.is_empty()
            && !self.git.branch.is_empty()
            && !self.git.pat_sealed.is_empty()
    }

    /// Storage root: the user's choice, or `fallback` when unset.
    pub fn base_dir(&self, fallback: &Path) -> PathBuf {
        let chosen = self.storage_dir.trim();
        if chosen.is_empty() {
            fallback.to_path_buf()
        } else {
            PathBuf::from(chosen)
        }
    }

    pub fn repo_dir(&self, fallback: &Path) -> PathBuf {
        self.base_dir(fallback).join(REPO_DIR)
    }

    pub fn data_file_path(&self, fallback: &Path) -> PathBuf {
        self.repo_dir(fallback).join(DATA_SUBDIR).join(DATA_FILE)
    }
}

/// `<path>.rotate` — sibling journal file used by password rotation.
pub fn journal_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.push('.');
    name.push_str(ROTATE_JOURNAL_SUFFIX);
    path.with_file_name(name)
}

/// Finish or undo a password rotation interrupted by a crash.
///
/// Rotation commits in a fixed order: document journal and settings journal
/// are written, then the document is renamed into place, then the settings.
/// Which journal files remain tells us exactly how far it got:
///
/// - both journals present → the document was never committed → roll back;
/// - only the settings journal present → the document was committed → roll
///   the settings forward so the new salt and verifier match it;
/// - only the document journal present → nothing was committed → roll back.
///
/// Returns true when settings were rolled forward (caller must reload them).
pub fn recover_pending_rotation(settings_path: &Path, data_path: &Path) -> Result<bool> {
    let settings_journal = journal_path(settings_path);
    let data_journal = journal_path(data_path);

    if settings_journal.exists() {
        if data_journal.exists() {
            fs::remove_file(&data_journal)?;
            fs::remove_file(&settings_journal)?;
            return Ok(false);
        }
        fs::rename(&settings_journal, settings_path)?;
        return Ok(true);
    }
    if data_journal.exists() {
        fs::remove_file(&data_journal)?;
    }
    Ok(false)
}

/// Trim stray quotes and trailing slashes from a user-entered repo URL.
pub fn sanitize_repo_url(input: &str) -> String {
    input
        .trim()
        .trim_matches(['\'', '"'])
        .trim_end_matches('/')
        .to_owned()
}
