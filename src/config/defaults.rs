// src/config/defaults.rs
use std::path::PathBuf;

pub const DEFAULT_BRANCH: &str = "main";

pub fn default_branch() -> String {
    DEFAULT_BRANCH.to_owned()
}

/// Fallback storage root when the user has not picked one.
pub fn default_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("gitnote-vault")
}
