// src/core/crypto/mod.rs
//! Pure cryptographic operations — no I/O, no settings access
//!
//! All functions work exclusively on in-memory buffers.
//! Key derivation is deterministic; encryption draws a fresh IV per call.
mod decrypt;
mod derive;
mod encrypt;
mod envelope;

pub use decrypt::decrypt_payload;
pub use derive::{derive_key, generate_salt};
pub use encrypt::encrypt_payload;
pub use envelope::Envelope;
