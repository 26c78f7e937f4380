// src/consts.rs
//! Shared constants — security parameters and defaults

use std::time::Duration;

/// PBKDF2-HMAC-SHA256 iterations for the vault key (2025+)
// ~0.1–0.2s on modern hardware — defense against GPU cracking
pub const VAULT_PBKDF2_ROUNDS: u32 = 210_000;

/// Vault key size in bytes (AES-256)
pub const VAULT_KEY_BYTES: usize = 32;

/// Random salt size for key derivation
pub const VAULT_SALT_BYTES: usize = 16;

/// AES-GCM nonce size
pub const ENVELOPE_IV_BYTES: usize = 12;

/// AES-GCM authentication tag size
pub const ENVELOPE_TAG_BYTES: usize = 16;

/// Current envelope wire-format version
pub const ENVELOPE_VERSION: u32 = 1;

/// Known plaintext encrypted into the vault verifier at setup time
pub const VAULT_VERIFIER_PLAINTEXT: &str = "vault-ok";

/// Quiet period after the last save before a sync runs
pub const SYNC_DEBOUNCE: Duration = Duration::from_secs(5);

/// Fixed commit message for auto-sync commits
pub const SYNC_COMMIT_MESSAGE: &str = "update";

/// Settings file name inside the configuration directory
pub const SETTINGS_FILE: &str = "config.toml";

/// Suffix appended to a file path for the two-file rotation journal
pub const ROTATE_JOURNAL_SUFFIX: &str = "rotate";

/// Repository mirror directory under the storage root
pub const REPO_DIR: &str = "repo";

/// Data directory inside the repository working tree
pub const DATA_SUBDIR: &str = "storage";

/// The single whole-document data file
pub const DATA_FILE: &str = "data.json";

/// Keychain entry holding the device key that seals the access token
pub const KEYCHAIN_SERVICE: &str = "gitnote-vault";
pub const KEYCHAIN_USER: &str = "device-key";

/// Tail size for log reads
pub const MAX_LOG_LINES: usize = 1000;
