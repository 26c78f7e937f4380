// src/lib.rs
//! gitnote-vault — encrypted note store with git-backed sync
//!
//! Features:
//! - Password-derived AES-256-GCM envelope encryption of one JSON document
//! - Atomic persistence with encrypted/plaintext mode migration
//! - Debounced commit/push against a git remote, conflict escalation
//! - Redacted diagnostics, keychain-sealed access token

pub mod aliases;
pub mod config;
pub mod consts;
pub mod core;
pub mod engine;
pub mod enums;
pub mod error;
pub mod logging;
pub mod redact;
pub mod secrets;
pub mod sync;

// Re-export everything hosts need at the crate root
pub use aliases::{AccessToken, DeviceKey32, SecureConversionsExt, SecureRandomExt, VaultKey32};
pub use config::{sanitize_repo_url, GitSettings, Settings};
pub use crate::core::{Item, ItemStore, ModeSwitch, Result as CoreResult, VaultManager, VaultStatus};
pub use engine::{ConfigSaved, Engine, InitPayload, ItemChange, SecurityStatus, VaultPayload};
pub use enums::{ConflictChoice, DataMode};
pub use error::EngineError;
pub use redact::{mask_path_for_display, redact};
pub use secrets::TokenGuard;
pub use sync::{Clock, ConflictResolution, GitSyncEngine, SyncOutcome, SyncState, SystemClock};
