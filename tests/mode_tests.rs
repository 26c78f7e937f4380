// tests/mode_tests.rs
//! Encrypted ↔ plaintext migration

mod common;
mod support;

use std::fs;

use gitnote_vault::error::EngineError;
use gitnote_vault::{DataMode, Engine, TokenGuard};
use support::{engine_fixture, plaintext_fixture, TEST_DEVICE_KEY};

#[test]
fn test_set_mode_is_idempotent() {
    common::setup();
    let mut fixture = engine_fixture();
    fixture.engine.setup_vault("pw").unwrap();
    fixture.engine.create_item("stays put").unwrap();

    let data_path = fixture.dir.path().join("repo/storage/data.json");
    let before = fs::read(&data_path).unwrap();

    let switch = fixture
        .engine
        .set_storage_mode(DataMode::Encrypted, None)
        .unwrap();
    assert_eq!(switch.mode, DataMode::Encrypted);
    assert_eq!(switch.items.len(), 1);
    assert_eq!(switch.items[0].text, "stays put");
    // No rewrite happened
    assert_eq!(fs::read(&data_path).unwrap(), before);
}

#[test]
fn test_switch_to_plaintext_requires_vault() {
    let mut fixture = engine_fixture();
    assert!(matches!(
        fixture.engine.set_storage_mode(DataMode::Plaintext, None),
        Err(EngineError::NotConfigured)
    ));
}

#[test]
fn test_switch_to_plaintext_requires_password_when_locked() {
    let mut fixture = engine_fixture();
    fixture.engine.setup_vault("pw").unwrap();
    fixture.engine.lock_vault();
    assert!(matches!(
        fixture.engine.set_storage_mode(DataMode::Plaintext, None),
        Err(EngineError::PasswordRequired)
    ));
    assert!(matches!(
        fixture
            .engine
            .set_storage_mode(DataMode::Plaintext, Some("wrong")),
        Err(EngineError::IncorrectPassword)
    ));
}

#[test]
fn test_switch_to_plaintext_rewrites_document() {
    let mut fixture = engine_fixture();
    fixture.engine.setup_vault("pw").unwrap();
    fixture.engine.create_item("now visible").unwrap();
    fixture.engine.lock_vault();

    let switch = fixture
        .engine
        .set_storage_mode(DataMode::Plaintext, Some("pw"))
        .unwrap();
    assert_eq!(switch.mode, DataMode::Plaintext);
    assert_eq!(switch.items[0].text, "now visible");

    let raw = fs::read_to_string(fixture.dir.path().join("repo/storage/data.json")).unwrap();
    assert!(raw.trim_start().starts_with('['));
    assert!(raw.contains("now visible"));

    // The flip is persisted
    let reopened = Engine::open(fixture.dir.path(), TokenGuard::with_key(TEST_DEVICE_KEY)).unwrap();
    assert_eq!(reopened.data_mode(), DataMode::Plaintext);
}

#[test]
fn test_switch_to_encrypted_with_first_time_setup() {
    let mut fixture = plaintext_fixture();
    fixture.engine.create_item("to be sealed").unwrap();

    assert!(matches!(
        fixture.engine.set_storage_mode(DataMode::Encrypted, None),
        Err(EngineError::PasswordRequired)
    ));

    let switch = fixture
        .engine
        .set_storage_mode(DataMode::Encrypted, Some("fresh-pw"))
        .unwrap();
    assert_eq!(switch.mode, DataMode::Encrypted);
    assert_eq!(switch.items[0].text, "to be sealed");
    assert!(fixture.engine.vault_status().configured);
    assert!(fixture.engine.vault_status().unlocked);

    let raw = fs::read_to_string(fixture.dir.path().join("repo/storage/data.json")).unwrap();
    assert!(raw.contains("\"encrypted\""));
    assert!(!raw.contains("to be sealed"));
}

#[test]
fn test_mode_round_trip_preserves_items() {
    let mut fixture = engine_fixture();
    fixture.engine.setup_vault("pw").unwrap();
    fixture.engine.create_item("one").unwrap();
    fixture.engine.create_item("two").unwrap();

    fixture
        .engine
        .set_storage_mode(DataMode::Plaintext, None)
        .unwrap();
    let back = fixture
        .engine
        .set_storage_mode(DataMode::Encrypted, None)
        .unwrap();

    let texts: Vec<&str> = back.items.iter().map(|item| item.text.as_str()).collect();
    assert_eq!(texts, vec!["two", "one"]);
}

#[test]
fn test_switch_to_encrypted_unlocks_with_password() {
    let mut fixture = engine_fixture();
    fixture.engine.setup_vault("pw").unwrap();
    fixture.engine.create_item("note").unwrap();
    fixture
        .engine
        .set_storage_mode(DataMode::Plaintext, None)
        .unwrap();
    fixture.engine.lock_vault();

    assert!(matches!(
        fixture.engine.set_storage_mode(DataMode::Encrypted, None),
        Err(EngineError::PasswordRequired)
    ));
    let switch = fixture
        .engine
        .set_storage_mode(DataMode::Encrypted, Some("pw"))
        .unwrap();
    assert_eq!(switch.mode, DataMode::Encrypted);
    assert_eq!(switch.items[0].text, "note");
}
