// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for all #[derive(...)] enums that represent
//! user-visible choices: storage mode, push-conflict resolution, etc.

use serde::{Deserialize, Serialize};

/// On-disk encoding of the item document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    #[default]
    Encrypted,
    Plaintext,
}

impl DataMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DataMode::Encrypted => "encrypted",
            DataMode::Plaintext => "plaintext",
        }
    }
}

/// How the user wants a rejected push handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum ConflictChoice {
    /// `push --force-with-lease` — overwrite the remote unless it moved again
    ForceOverwrite,
    /// Hand the working tree to the user and pause auto-sync
    ManualResolve,
    /// Leave local commits unpushed; the next debounce cycle retries
    Cancel,
}
