// tests/crypto_tests.rs
//! Envelope and key-derivation properties

mod common;

use gitnote_vault::core::{decrypt_payload, derive_key, encrypt_payload};
use gitnote_vault::error::EngineError;

fn key_for(password: &str, salt: &[u8]) -> [u8; 32] {
    *derive_key(password, salt).expect("derive key").expose_secret()
}

#[test]
fn test_encrypt_decrypt_roundtrip() {
    common::setup();
    let key = key_for("correct horse battery staple", b"0123456789abcdef");
    let payload = encrypt_payload(b"Attack at dawn!", &key).unwrap();
    let plain = decrypt_payload(&payload, &key).unwrap();
    assert_eq!(plain.as_slice(), b"Attack at dawn!");
}

#[test]
fn test_derive_key_is_deterministic() {
    let salt = b"fixed-salt-bytes";
    assert_eq!(key_for("hunter2", salt), key_for("hunter2", salt));
    assert_ne!(key_for("hunter2", salt), key_for("hunter3", salt));
    assert_ne!(key_for("hunter2", salt), key_for("hunter2", b"another-salt-xyz"));
}

#[test]
fn test_derive_key_rejects_empty_inputs() {
    assert!(matches!(
        derive_key("", b"some-salt"),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        derive_key("hunter2", b""),
        Err(EngineError::InvalidInput(_))
    ));
}

#[test]
fn test_fresh_iv_per_call() {
    let key = key_for("pw", b"salt-salt-salt-1");
    let first = encrypt_payload(b"same plaintext", &key).unwrap();
    let second = encrypt_payload(b"same plaintext", &key).unwrap();
    // Different IVs → different ciphertexts, both decrypt fine
    assert_ne!(first, second);
    assert_eq!(decrypt_payload(&first, &key).unwrap(), b"same plaintext");
    assert_eq!(decrypt_payload(&second, &key).unwrap(), b"same plaintext");
}

#[test]
fn test_decrypt_with_wrong_key_fails_authentication() {
    let key = key_for("right", b"salt-salt-salt-1");
    let wrong = key_for("wrong", b"salt-salt-salt-1");
    let payload = encrypt_payload(b"secret", &key).unwrap();
    assert!(matches!(
        decrypt_payload(&payload, &wrong),
        Err(EngineError::DecryptionFailure)
    ));
}

#[test]
fn test_decrypt_rejects_garbage_payload() {
    let key = key_for("pw", b"salt-salt-salt-1");
    assert!(matches!(
        decrypt_payload("not json at all", &key),
        Err(EngineError::FormatError)
    ));
    assert!(matches!(
        decrypt_payload("{\"version\":1}", &key),
        Err(EngineError::FormatError)
    ));
}

#[test]
fn test_decrypt_rejects_unknown_version() {
    let key = key_for("pw", b"salt-salt-salt-1");
    let payload = encrypt_payload(b"data", &key).unwrap();
    let bumped = payload.replace("\"version\":1", "\"version\":2");
    assert!(matches!(
        decrypt_payload(&bumped, &key),
        Err(EngineError::FormatError)
    ));
}

#[test]
fn test_decrypt_rejects_bad_iv_length() {
    let key = key_for("pw", b"salt-salt-salt-1");
    let payload = r#"{"version":1,"iv":"c2hvcnQ=","tag":"AAAAAAAAAAAAAAAAAAAAAA==","ciphertext":"AAAA"}"#;
    assert!(matches!(
        decrypt_payload(payload, &key),
        Err(EngineError::FormatError)
    ));
}

#[test]
fn test_tampered_ciphertext_fails_authentication() {
    let key = key_for("pw", b"salt-salt-salt-1");
    let payload = encrypt_payload(b"integrity matters", &key).unwrap();
    // Swap the tag for a syntactically valid but wrong one
    let mut envelope: serde_json::Value = serde_json::from_str(&payload).unwrap();
    envelope["tag"] = serde_json::Value::String("AAAAAAAAAAAAAAAAAAAAAA==".into());
    let tampered = envelope.to_string();
    assert!(matches!(
        decrypt_payload(&tampered, &key),
        Err(EngineError::DecryptionFailure)
    ));
}
