// src/sync/mod.rs
//! GitSyncEngine — debounced commit/push of the data directory
//!
//! State machine: Idle → PendingDebounce → Syncing → {Idle, ConflictPending}.
//! The document is one whole-file JSON blob, so push conflicts are never
//! auto-merged; they escalate to the user (force-with-lease / manual /
//! cancel). Background failures are logged redacted and swallowed — sync must
//! never block editing.

mod git;

pub use git::GitRunner;

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use tracing::warn;

use crate::aliases::AccessToken;
use crate::config::GitSettings;
use crate::consts::{SYNC_COMMIT_MESSAGE, SYNC_DEBOUNCE};
use crate::enums::ConflictChoice;
use crate::error::EngineError;
use crate::redact::redact;

type Result<T> = std::result::Result<T, EngineError>;

/// Time source for the debounce deadline; swapped for a fake in tests.
pub trait Clock: Send {
    fn now(&self) -> Instant;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    PendingDebounce,
    Syncing,
    ConflictPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Nothing to sync against (git not configured).
    Skipped,
    Pushed,
    /// Push rejected; detail is redacted. Awaiting a [`ConflictChoice`].
    Conflict(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictResolution {
    Forced,
    /// Auto-sync paused; the user resolves inside this working tree.
    Manual(PathBuf),
    Cancelled,
}

pub struct GitSyncEngine {
    runner: GitRunner,
    state: SyncState,
    deadline: Option<Instant>,
    paused: bool,
    clock: Box<dyn Clock>,
    doc_lock: Arc<Mutex<()>>,
    tree_lock: Mutex<()>,
}

impl GitSyncEngine {
    pub fn new(repo_dir: PathBuf, doc_lock: Arc<Mutex<()>>) -> Self {
        Self::with_clock(repo_dir, doc_lock, Box::new(SystemClock))
    }

    pub fn with_clock(repo_dir: PathBuf, doc_lock: Arc<Mutex<()>>, clock: Box<dyn Clock>) -> Self {
        Self {
            runner: GitRunner::new(repo_dir),
            state: SyncState::Idle,
            deadline: None,
            paused: false,
            clock,
            doc_lock,
            tree_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Re-enable auto-sync after a manual resolution.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn set_repo_dir(&mut self, repo_dir: PathBuf) {
        self.runner.set_repo_dir(repo_dir);
    }

    /// Clone the remote on first run, or re-point and refresh an existing
    /// mirror: `remote set-url`, `fetch`, `checkout` (creating the local
    /// tracking branch when missing).
    pub fn ensure_repository(&self, git: &GitSettings, token: &AccessToken) -> Result<()> {
        let repo_dir = self.runner.repo_dir().to_path_buf();
        let parent = repo_dir
            .parent()
            .ok_or_else(|| EngineError::Config("repository path has no parent".into()))?;
        fs::create_dir_all(parent)?;

        if !repo_dir.join(".git").exists() {
            let target = repo_dir.to_string_lossy();
            self.runner.run_in(
                parent,
                Some(token),
                &["clone", "--branch", &git.branch, &git.repo_url, &target],
            )?;
            return Ok(());
        }

        self.runner
            .run(Some(token), &["remote", "set-url", "origin", &git.repo_url])?;
        self.runner
            .run(Some(token), &["fetch", "origin", &git.branch])?;
        if self.runner.run(Some(token), &["checkout", &git.branch]).is_err() {
            let tracking = format!("origin/{}", git.branch);
            self.runner
                .run(Some(token), &["checkout", "-b", &git.branch, &tracking])?;
        }
        Ok(())
    }

    /// Best-effort rebase pull at startup. Failures are logged and swallowed
    /// so sync can never block launch.
    pub fn pull_on_startup(&mut self, git: &GitSettings, token: &AccessToken) {
        let result = self.ensure_repository(git, token).and_then(|()| {
            self.runner
                .run(Some(token), &["pull", "--rebase", "origin", &git.branch])
                .map(|_| ())
        });
        if let Err(err) = result {
            warn!("startup pull failed: {}", redact(&err.to_string()));
        }
    }

    /// (Re)start the debounce window. Bursts of saves collapse into one sync
    /// attempt; only the latest reset matters.
    pub fn schedule_sync(&mut self) {
        if self.paused {
            return;
        }
        self.deadline = Some(self.clock.now() + SYNC_DEBOUNCE);
        if self.state == SyncState::Idle {
            self.state = SyncState::PendingDebounce;
        }
    }

    /// Pump the debounce timer. Runs the pending sync once the quiet period
    /// has elapsed; failures here are background failures (logged, swallowed)
    /// except conflicts, which surface for resolution.
    pub fn tick(&mut self, git: &GitSettings, token: Option<&AccessToken>) -> Option<SyncOutcome> {
        if self.paused || self.state != SyncState::PendingDebounce {
            return None;
        }
        let due = self.deadline?;
        if self.clock.now() < due {
            return None;
        }
        match self.sync_now(git, token) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!("debounced sync failed: {}", redact(&err.to_string()));
                None
            }
        }
    }

    /// Stage, commit (an empty diff counts as success), push. A rejected
    /// push parks the engine in `ConflictPending` until the user chooses.
    pub fn sync_now(&mut self, git: &GitSettings, token: Option<&AccessToken>) -> Result<SyncOutcome> {
        self.deadline = None;
        let token = match token {
            Some(token) if !git.repo_url.is_empty() => token,
            _ => {
                self.state = SyncState::Idle;
                return Ok(SyncOutcome::Skipped);
            }
        };

        self.state = SyncState::Syncing;
        let result = self.run_pipeline(git, token);
        match result {
            Ok(()) => {
                self.state = SyncState::Idle;
                Ok(SyncOutcome::Pushed)
            }
            Err(err) => {
                self.state = SyncState::ConflictPending;
                Ok(SyncOutcome::Conflict(redact(&err.to_string())))
            }
        }
    }

    fn run_pipeline(&self, git: &GitSettings, token: &AccessToken) -> Result<()> {
        // Sync must not read the tree while a save is in flight.
        let _tree = self.tree_lock.lock().expect("tree lock poisoned");
        let _doc = self.doc_lock.lock().expect("document lock poisoned");

        self.runner.run(Some(token), &["add", "."])?;
        if let Err(err) = self
            .runner
            .run(Some(token), &["commit", "-m", SYNC_COMMIT_MESSAGE])
        {
            if !err.to_string().contains("nothing to commit") {
                return Err(err);
            }
        }
        self.runner
            .run(Some(token), &["push", "origin", &git.branch])?;
        Ok(())
    }

    /// Apply the user's answer to a pending push conflict.
    pub fn resolve_conflict(
        &mut self,
        choice: ConflictChoice,
        git: &GitSettings,
        token: Option<&AccessToken>,
    ) -> Result<ConflictResolution> {
        match choice {
            ConflictChoice::ForceOverwrite => {
                let token = token.ok_or(EngineError::NotConfigured)?;
                // Refresh the remote-tracking ref so the lease compares
                // against the remote as observed right now; anything that
                // lands between this fetch and the push still aborts it.
                self.runner
                    .run(Some(token), &["fetch", "origin", &git.branch])?;
                match self
                    .runner
                    .run(Some(token), &["push", "--force-with-lease", "origin", &git.branch])
                {
                    Ok(_) => {
                        self.settle();
                        Ok(ConflictResolution::Forced)
                    }
                    Err(err) => {
                        // The remote moved again since the last fetch.
                        self.state = SyncState::ConflictPending;
                        Err(EngineError::PushConflict(redact(&err.to_string())))
                    }
                }
            }
            ConflictChoice::ManualResolve => {
                self.paused = true;
                self.settle();
                Ok(ConflictResolution::Manual(
                    self.runner.repo_dir().to_path_buf(),
                ))
            }
            ConflictChoice::Cancel => {
                self.settle();
                Ok(ConflictResolution::Cancelled)
            }
        }
    }

    /// Leave conflict state; edits queued during the conflict keep their
    /// pending debounce so they ride the next cycle.
    fn settle(&mut self) {
        self.state = if self.deadline.is_some() && !self.paused {
            SyncState::PendingDebounce
        } else {
            SyncState::Idle
        };
    }
}
