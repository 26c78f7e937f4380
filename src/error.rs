// src/error.rs
//! Public error type for the entire crate

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("keychain error: {0}")]
    Keychain(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Validation(String),

    #[error("vault is locked")]
    Locked,

    #[error("vault is not configured")]
    NotConfigured,

    #[error("vault is already configured")]
    AlreadyConfigured,

    #[error("vault password is incorrect")]
    IncorrectPassword,

    #[error("vault password is required")]
    PasswordRequired,

    #[error("failed to decrypt data file; check your vault password")]
    DecryptionFailure,

    #[error("encrypted payload format is not supported")]
    FormatError,

    #[error("item not found: {0}")]
    NotFound(String),

    #[error("git is not installed or unavailable in PATH")]
    GitUnavailable,

    #[error("git command failed: {0}")]
    Git(String),

    #[error("push rejected by remote: {0}")]
    PushConflict(String),

    #[error("crypto operation failed: {0}")]
    Crypto(String),
}
