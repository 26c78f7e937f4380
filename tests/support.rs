// tests/support.rs
//! Test utilities — temp-dir engine fixtures and a controllable clock

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use gitnote_vault::consts::SETTINGS_FILE;
use gitnote_vault::{Clock, DataMode, Engine, Settings, TokenGuard};
use tempfile::TempDir;

#[allow(dead_code)]
pub const TEST_DEVICE_KEY: [u8; 32] = [7u8; 32];

pub struct TestVault {
    // Held so the tree outlives the engine
    pub dir: TempDir,
    pub engine: Engine,
}

#[allow(dead_code)]
pub fn engine_fixture() -> TestVault {
    let dir = TempDir::new().expect("create temp dir");
    let engine =
        Engine::open(dir.path(), TokenGuard::with_key(TEST_DEVICE_KEY)).expect("open engine");
    TestVault { dir, engine }
}

/// Fixture whose settings start in plaintext mode.
#[allow(dead_code)]
pub fn plaintext_fixture() -> TestVault {
    let dir = TempDir::new().expect("create temp dir");
    let mut settings = Settings::default();
    settings.security.data_mode = DataMode::Plaintext;
    settings
        .save(&dir.path().join(SETTINGS_FILE))
        .expect("seed settings");
    let engine =
        Engine::open(dir.path(), TokenGuard::with_key(TEST_DEVICE_KEY)).expect("open engine");
    TestVault { dir, engine }
}

#[allow(dead_code)]
pub fn engine_with_clock(clock: FakeClock) -> TestVault {
    let dir = TempDir::new().expect("create temp dir");
    let engine = Engine::with_clock(
        dir.path(),
        TokenGuard::with_key(TEST_DEVICE_KEY),
        Box::new(clock),
    )
    .expect("open engine");
    TestVault { dir, engine }
}

/// Manually advanced time source for debounce tests.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<Instant>>,
}

#[allow(dead_code)]
impl FakeClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.lock().expect("clock lock") += by;
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("clock lock")
    }
}
