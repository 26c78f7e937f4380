// src/aliases.rs
//! Re-exports secure-gate's ergonomic secret types
//!
//! These are the canonical types used throughout gitnote-vault.

pub use secure_gate::{
    dynamic_alias, fixed_alias, SecureConversionsExt, SecureRandomExt,
};

// Fixed-size secrets
fixed_alias!(VaultKey32, 32); // 256-bit session key derived from the vault password
fixed_alias!(DeviceKey32, 32); // keychain-held key sealing the access token at rest

// Dynamic secrets
dynamic_alias!(AccessToken, String); // unsealed PAT, transient per git invocation
