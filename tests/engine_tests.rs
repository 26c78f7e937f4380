// tests/engine_tests.rs
//! The collaborator boundary: init payload, configuration, storage root,
//! logout, and token sealing

mod common;
mod support;

use std::fs;

use gitnote_vault::error::EngineError;
use gitnote_vault::{sanitize_repo_url, DataMode, TokenGuard};
use support::{engine_fixture, plaintext_fixture, TEST_DEVICE_KEY};

#[test]
fn test_init_payload_before_configuration() {
    common::setup();
    let fixture = engine_fixture();
    let payload = fixture.engine.init();

    assert!(!payload.configured);
    assert!(payload.items.is_empty());
    assert!(payload.repo_url.is_empty());
    assert_eq!(payload.branch, "main");
    assert_eq!(payload.security.data_mode, DataMode::Encrypted);
    assert!(!payload.vault.configured);
    assert!(!payload.vault.unlocked);
}

#[test]
fn test_save_config_validation() {
    let mut fixture = engine_fixture();

    assert!(matches!(
        fixture.engine.save_config("", "main", ""),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        fixture
            .engine
            .save_config("http://github.com/a/b.git", "main", "ghp_x"),
        Err(EngineError::Validation(_))
    ));
    assert!(!fixture.engine.is_configured());
}

#[test]
fn test_sanitize_repo_url() {
    assert_eq!(
        sanitize_repo_url("  \"https://github.com/a/b.git/\"  "),
        "https://github.com/a/b.git"
    );
    assert_eq!(
        sanitize_repo_url("'https://github.com/a/b'"),
        "https://github.com/a/b"
    );
}

#[test]
fn test_token_guard_seal_open_roundtrip() {
    let guard = TokenGuard::with_key(TEST_DEVICE_KEY);
    let sealed = guard.seal("ghp_verysecret").unwrap();
    assert!(!sealed.contains("ghp_verysecret"));

    let token = guard.open(&sealed).unwrap();
    assert_eq!(token.expose_secret().as_str(), "ghp_verysecret");
}

#[test]
fn test_token_guard_rejects_foreign_device_key() {
    let sealed = TokenGuard::with_key(TEST_DEVICE_KEY)
        .seal("ghp_verysecret")
        .unwrap();
    let other = TokenGuard::with_key([9u8; 32]);
    assert!(matches!(
        other.open(&sealed),
        Err(EngineError::DecryptionFailure)
    ));
}

#[test]
fn test_logout_clears_git_settings_and_repo() {
    let mut fixture = engine_fixture();

    // Fake an existing local mirror
    let repo_dir = fixture.engine.repo_dir();
    fs::create_dir_all(repo_dir.join(".git")).unwrap();

    fixture.engine.logout(true).unwrap();
    assert!(!fixture.engine.is_configured());
    assert!(!repo_dir.exists());
}

#[test]
fn test_logout_keeps_repo_without_cleanup() {
    let mut fixture = engine_fixture();
    let repo_dir = fixture.engine.repo_dir();
    fs::create_dir_all(repo_dir.join(".git")).unwrap();

    fixture.engine.logout(false).unwrap();
    assert!(repo_dir.exists());
}

#[test]
fn test_set_storage_dir_validation() {
    let mut fixture = engine_fixture();
    assert!(matches!(
        fixture.engine.set_storage_dir(""),
        Err(EngineError::Validation(_))
    ));
    assert!(matches!(
        fixture.engine.set_storage_dir("relative/path"),
        Err(EngineError::Validation(_))
    ));
}

#[test]
fn test_set_and_reset_storage_dir() {
    let mut fixture = plaintext_fixture();
    fixture.engine.create_item("original root").unwrap();

    let other = tempfile::TempDir::new().unwrap();
    let target = other.path().join("custom-root");
    fixture
        .engine
        .set_storage_dir(target.to_str().unwrap())
        .unwrap();
    assert!(target.is_dir());

    // Documents now live under the new root
    fixture.engine.create_item("new root").unwrap();
    assert!(target.join("repo/storage/data.json").exists());

    // Back to the default root, where the original item still lives
    let items = fixture.engine.reset_storage_dir().unwrap();
    assert_eq!(items.len(), 0); // unconfigured → no load
    let items = fixture.engine.load_items().unwrap();
    assert_eq!(items[0].text, "original root");
}

#[test]
fn test_get_item() {
    let mut fixture = plaintext_fixture();
    let change = fixture.engine.create_item("fetch me").unwrap();
    let item = fixture.engine.get_item(&change.item.id).unwrap();
    assert_eq!(item.text, "fetch me");
    assert!(matches!(
        fixture.engine.get_item("missing"),
        Err(EngineError::NotFound(_))
    ));
}

#[test]
fn test_settings_survive_reopen() {
    let mut fixture = engine_fixture();
    fixture.engine.setup_vault("pw").unwrap();
    fixture.engine.create_item("persisted").unwrap();
    drop(fixture.engine);

    let mut reopened = gitnote_vault::Engine::open(
        fixture.dir.path(),
        TokenGuard::with_key(TEST_DEVICE_KEY),
    )
    .unwrap();
    assert!(reopened.vault_status().configured);
    assert!(!reopened.vault_status().unlocked);

    let payload = reopened.unlock_vault("pw").unwrap();
    assert_eq!(payload.items[0].text, "persisted");
}
