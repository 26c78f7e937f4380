// src/core/mod.rs
pub mod crypto;
pub mod mode;
pub mod store;
pub mod vault;

pub use crypto::{decrypt_payload, derive_key, encrypt_payload, generate_salt, Envelope};
pub use mode::{set_mode, ModeSwitch};
pub use store::{new_item_id, Item, ItemStore};
pub use vault::{RotationPlan, VaultManager, VaultStatus};

// Keep only the absolute top-level public API here if needed
pub type Result<T> = std::result::Result<T, crate::error::EngineError>;
