// src/engine.rs
//! The collaborator boundary — one Engine instance per process
//!
//! Hosts (CLI, IPC bridge, GUI shell) call these operations and render the
//! returned payloads; the engine never presents anything itself. All
//! operations run on the caller's single logical actor; the document file and
//! the repository working tree are the only shared state, each behind its
//! mutex.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::warn;

use crate::aliases::AccessToken;
use crate::config::{
    recover_pending_rotation, sanitize_repo_url, GitSettings, Settings,
};
use crate::consts::SETTINGS_FILE;
use crate::core::mode::{set_mode, ModeSwitch};
use crate::core::store::{Item, ItemStore};
use crate::core::vault::{VaultManager, VaultStatus};
use crate::enums::{ConflictChoice, DataMode};
use crate::error::EngineError;
use crate::redact::redact;
use crate::secrets::TokenGuard;
use crate::sync::{Clock, ConflictResolution, GitRunner, GitSyncEngine, SyncOutcome};

type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SecurityStatus {
    pub data_mode: DataMode,
}

#[derive(Debug, Serialize)]
pub struct InitPayload {
    pub git_installed: bool,
    pub configured: bool,
    pub repo_url: String,
    pub branch: String,
    pub storage_dir: String,
    pub default_storage_dir: String,
    pub security: SecurityStatus,
    pub vault: VaultStatus,
    pub items: Vec<Item>,
}

#[derive(Debug, Serialize)]
pub struct ConfigSaved {
    pub items: Vec<Item>,
    pub security: SecurityStatus,
    pub vault: VaultStatus,
}

#[derive(Debug, Serialize)]
pub struct VaultPayload {
    pub items: Vec<Item>,
    pub security: SecurityStatus,
    pub vault: VaultStatus,
}

#[derive(Debug, Serialize)]
pub struct ItemChange {
    pub item: Item,
    pub items: Vec<Item>,
}

pub struct Engine {
    config_dir: PathBuf,
    settings_path: PathBuf,
    settings: Settings,
    guard: TokenGuard,
    vault: VaultManager,
    store: ItemStore,
    sync: GitSyncEngine,
}

impl Engine {
    /// Open the engine rooted at `config_dir` (where the settings file and,
    /// by default, the storage root live). Completes any password rotation a
    /// crash interrupted before anything else reads the document.
    pub fn open(config_dir: &Path, guard: TokenGuard) -> Result<Self> {
        Self::with_clock(config_dir, guard, Box::new(crate::sync::SystemClock))
    }

    pub fn with_clock(config_dir: &Path, guard: TokenGuard, clock: Box<dyn Clock>) -> Result<Self> {
        fs::create_dir_all(config_dir)?;
        let settings_path = config_dir.join(SETTINGS_FILE);
        let mut settings = Settings::load(&settings_path)?;
        let data_path = settings.data_file_path(config_dir);
        if recover_pending_rotation(&settings_path, &data_path)? {
            settings = Settings::load(&settings_path)?;
        }

        let vault = VaultManager::from_settings(&settings.vault);
        let doc_lock = Arc::new(Mutex::new(()));
        let store = ItemStore::new(data_path, Arc::clone(&doc_lock));
        let sync = GitSyncEngine::with_clock(settings.repo_dir(config_dir), doc_lock, clock);

        Ok(Self {
            config_dir: config_dir.to_path_buf(),
            settings_path,
            settings,
            guard,
            vault,
            store,
            sync,
        })
    }

    pub fn data_mode(&self) -> DataMode {
        self.settings.security.data_mode
    }

    pub fn is_configured(&self) -> bool {
        self.settings.is_git_configured()
    }

    pub fn security(&self) -> SecurityStatus {
        SecurityStatus {
            data_mode: self.data_mode(),
        }
    }

    pub fn vault_status(&self) -> VaultStatus {
        self.vault.status()
    }

    pub fn repo_dir(&self) -> PathBuf {
        self.settings.repo_dir(&self.config_dir)
    }

    fn can_load_now(&self) -> bool {
        self.data_mode() == DataMode::Plaintext || self.vault.is_unlocked()
    }

    /// Unseal the stored access token for one git invocation. Failures are
    /// logged (redacted) and read as "not configured".
    fn token(&self) -> Option<AccessToken> {
        if self.settings.git.pat_sealed.is_empty() {
            return None;
        }
        match self.guard.open(&self.settings.git.pat_sealed) {
            Ok(token) => Some(token),
            Err(err) => {
                warn!("unsealing access token failed: {}", redact(&err.to_string()));
                None
            }
        }
    }

    /// One-shot startup sync: best-effort repository refresh and pull.
    /// Never blocks or fails launch.
    pub fn startup(&mut self) {
        if !self.is_configured() {
            return;
        }
        if let Some(token) = self.token() {
            self.sync.pull_on_startup(&self.settings.git, &token);
        }
        if let Err(err) = self.store.ensure_document(self.data_mode(), &self.vault) {
            warn!("ensuring data file failed: {}", redact(&err.to_string()));
        }
    }

    pub fn init(&self) -> InitPayload {
        let items = if self.is_configured() && self.can_load_now() {
            self.store
                .load(self.data_mode(), &self.vault)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        InitPayload {
            git_installed: GitRunner::available(),
            configured: self.is_configured(),
            repo_url: self.settings.git.repo_url.clone(),
            branch: self.settings.git.branch.clone(),
            storage_dir: self.settings.storage_dir.clone(),
            default_storage_dir: self.config_dir.to_string_lossy().into_owned(),
            security: self.security(),
            vault: self.vault_status(),
            items,
        }
    }

    pub fn save_config(&mut self, repo_url: &str, branch: &str, pat: &str) -> Result<ConfigSaved> {
        let repo_url = sanitize_repo_url(repo_url);
        let branch = {
            let trimmed = branch.trim();
            if trimmed.is_empty() { "main" } else { trimmed }.to_owned()
        };
        let pat = pat.trim();

        if repo_url.is_empty() || pat.is_empty() {
            return Err(EngineError::Validation(
                "repo URL, branch and PAT are required".into(),
            ));
        }
        if !repo_url.starts_with("https://") {
            return Err(EngineError::Validation("repo URL must use HTTPS".into()));
        }
        if !GitRunner::available() {
            return Err(EngineError::GitUnavailable);
        }

        let pat_sealed = self.guard.seal(pat)?;
        let mut next = self.settings.clone();
        next.git = GitSettings {
            repo_url,
            branch,
            pat_sealed,
        };
        next.save(&self.settings_path)?;
        self.settings = next;

        let token = AccessToken::new(pat.to_owned());
        self.sync.ensure_repository(&self.settings.git, &token)?;
        self.sync.pull_on_startup(&self.settings.git, &token);
        self.store.ensure_document(self.data_mode(), &self.vault)?;

        let items = if self.can_load_now() {
            self.store
                .load(self.data_mode(), &self.vault)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(ConfigSaved {
            items,
            security: self.security(),
            vault: self.vault_status(),
        })
    }

    pub fn setup_vault(&mut self, password: &str) -> Result<VaultPayload> {
        if self.vault.is_configured() {
            return Err(EngineError::AlreadyConfigured);
        }
        self.vault.setup(password)?;

        let mut next = self.settings.clone();
        next.vault = self.vault.vault_settings();
        if let Err(err) = next.save(&self.settings_path) {
            // No partially-unlocked state may leak past a failed setup.
            self.vault = VaultManager::from_settings(&self.settings.vault);
            return Err(err);
        }
        self.settings = next;

        self.vault_payload()
    }

    pub fn unlock_vault(&mut self, password: &str) -> Result<VaultPayload> {
        if !self.vault.is_configured() {
            return Err(EngineError::NotConfigured);
        }
        self.vault.unlock(password)?;
        self.vault_payload()
    }

    fn vault_payload(&mut self) -> Result<VaultPayload> {
        match self.store.load(self.data_mode(), &self.vault) {
            Ok(items) => Ok(VaultPayload {
                items,
                security: self.security(),
                vault: self.vault_status(),
            }),
            Err(err) => {
                self.vault.lock();
                Err(err)
            }
        }
    }

    pub fn lock_vault(&mut self) {
        self.vault.lock();
    }

    /// Change the vault password. The verifier and (in Encrypted mode) the
    /// whole document move to the new key in one journaled transaction — a
    /// crash at any point either leaves the old state intact or completes on
    /// the next startup; no ordering strands the document under a lost salt.
    pub fn rotate_vault(&mut self, old_password: &str, new_password: &str) -> Result<()> {
        if !self.vault.is_configured() {
            return Err(EngineError::NotConfigured);
        }
        let plan = self.vault.prepare_rotation(old_password, new_password)?;

        if self.data_mode() == DataMode::Encrypted {
            let items = self.store.load(DataMode::Encrypted, &self.vault)?;
            let doc_journal = self.store.write_rotation_journal(&items, plan.key())?;

            let mut next = self.settings.clone();
            next.vault = plan.vault_settings();
            let settings_journal = next.write_journal(&self.settings_path)?;

            fs::rename(&doc_journal, self.store.data_path())?;
            fs::rename(&settings_journal, &self.settings_path)?;
            self.settings = next;
            self.sync.schedule_sync();
        } else {
            let mut next = self.settings.clone();
            next.vault = plan.vault_settings();
            next.save(&self.settings_path)?;
            self.settings = next;
        }

        self.vault.apply_rotation(plan);
        Ok(())
    }

    pub fn set_storage_mode(
        &mut self,
        target: DataMode,
        password: Option<&str>,
    ) -> Result<ModeSwitch> {
        let before = self.data_mode();
        let switch = set_mode(
            target,
            password,
            &mut self.settings,
            &self.settings_path,
            &mut self.vault,
            &self.store,
        )?;
        if switch.mode != before {
            self.sync.schedule_sync();
        }
        Ok(switch)
    }

    pub fn create_item(&mut self, text: &str) -> Result<ItemChange> {
        let (item, items) = self.store.create(text, self.data_mode(), &self.vault)?;
        self.sync.schedule_sync();
        Ok(ItemChange { item, items })
    }

    pub fn update_item(&mut self, id: &str, text: &str) -> Result<ItemChange> {
        let (item, items) = self.store.update(id, text, self.data_mode(), &self.vault)?;
        self.sync.schedule_sync();
        Ok(ItemChange { item, items })
    }

    pub fn delete_item(&mut self, id: &str) -> Result<Vec<Item>> {
        let items = self.store.delete(id, self.data_mode(), &self.vault)?;
        self.sync.schedule_sync();
        Ok(items)
    }

    pub fn get_item(&self, id: &str) -> Result<Item> {
        self.store.get(id, self.data_mode(), &self.vault)
    }

    pub fn load_items(&self) -> Result<Vec<Item>> {
        self.store.load(self.data_mode(), &self.vault)
    }

    /// Explicit user-initiated sync, bypassing the debounce.
    pub fn sync_now(&mut self) -> Result<SyncOutcome> {
        let token = self.token();
        self.sync.sync_now(&self.settings.git, token.as_ref())
    }

    /// Pump the debounce timer; hosts call this from their event loop.
    pub fn tick(&mut self) -> Option<SyncOutcome> {
        let token = self.token();
        self.sync.tick(&self.settings.git, token.as_ref())
    }

    pub fn resolve_conflict(&mut self, choice: ConflictChoice) -> Result<ConflictResolution> {
        let token = self.token();
        self.sync
            .resolve_conflict(choice, &self.settings.git, token.as_ref())
    }

    pub fn resume_sync(&mut self) {
        self.sync.resume();
    }

    pub fn sync_state(&self) -> crate::sync::SyncState {
        self.sync.state()
    }

    /// Forget the git configuration; with `clear_repo` also delete the local
    /// mirror — the only sanctioned way the repository state is destroyed.
    pub fn logout(&mut self, clear_repo: bool) -> Result<()> {
        let mut next = self.settings.clone();
        next.git = GitSettings::default();
        next.save(&self.settings_path)?;
        self.settings = next;

        if clear_repo {
            let repo_dir = self.repo_dir();
            if repo_dir.exists() {
                fs::remove_dir_all(&repo_dir)?;
            }
        }
        Ok(())
    }

    pub fn set_storage_dir(&mut self, dir: &str) -> Result<Vec<Item>> {
        let target = dir.trim();
        if target.is_empty() {
            return Err(EngineError::Validation("storage path is required".into()));
        }
        if !Path::new(target).is_absolute() {
            return Err(EngineError::Validation("storage path must be absolute".into()));
        }
        fs::create_dir_all(target)?;
        if !Path::new(target).is_dir() {
            return Err(EngineError::Validation("storage path is not a directory".into()));
        }
        self.apply_storage_dir(target.to_owned())
    }

    pub fn reset_storage_dir(&mut self) -> Result<Vec<Item>> {
        self.apply_storage_dir(String::new())
    }

    fn apply_storage_dir(&mut self, dir: String) -> Result<Vec<Item>> {
        let mut next = self.settings.clone();
        next.storage_dir = dir;
        next.save(&self.settings_path)?;
        self.settings = next;

        self.store
            .set_data_path(self.settings.data_file_path(&self.config_dir));
        self.sync.set_repo_dir(self.settings.repo_dir(&self.config_dir));

        if self.is_configured() {
            if let Some(token) = self.token() {
                self.sync.ensure_repository(&self.settings.git, &token)?;
            }
            self.store.ensure_document(self.data_mode(), &self.vault)?;
            if self.can_load_now() {
                return Ok(self
                    .store
                    .load(self.data_mode(), &self.vault)
                    .unwrap_or_default());
            }
        }
        Ok(Vec::new())
    }
}
