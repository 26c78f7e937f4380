// src/config/mod.rs
pub mod app;
pub mod defaults;

pub use app::{
    journal_path, recover_pending_rotation, sanitize_repo_url, GitSettings, SecuritySettings,
    Settings, VaultSettings,
};
