// src/sync/git.rs
//! Thin wrapper over the `git` binary
//!
//! The access token never appears in a URL, in argv as a credential, or in
//! the process environment: it rides in a transient per-invocation
//! `http.extraHeader` config flag. Command failures are redacted before they
//! become error values.

use std::path::{Path, PathBuf};
use std::process::Command;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::aliases::AccessToken;
use crate::error::EngineError;
use crate::redact::redact;

type Result<T> = std::result::Result<T, EngineError>;

pub struct GitRunner {
    repo_dir: PathBuf,
}

impl GitRunner {
    pub fn new(repo_dir: PathBuf) -> Self {
        Self { repo_dir }
    }

    pub fn repo_dir(&self) -> &Path {
        &self.repo_dir
    }

    pub fn set_repo_dir(&mut self, repo_dir: PathBuf) {
        self.repo_dir = repo_dir;
    }

    /// Can the git binary be invoked at all? Checked once at configuration
    /// time; sync features are unavailable without it.
    pub fn available() -> bool {
        Command::new("git")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false)
    }

    /// Run git inside the repository working tree.
    pub fn run(&self, token: Option<&AccessToken>, args: &[&str]) -> Result<String> {
        self.run_in(&self.repo_dir, token, args)
    }

    /// Run git with an explicit working directory (clone runs from the
    /// parent, since the target does not exist yet).
    pub fn run_in(&self, dir: &Path, token: Option<&AccessToken>, args: &[&str]) -> Result<String> {
        let mut cmd = Command::new("git");
        if let Some(token) = token {
            cmd.arg("-c").arg(auth_header(token));
        }
        cmd.args(args).current_dir(dir);

        let output = cmd.output().map_err(|_| EngineError::GitUnavailable)?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.success() {
            return Ok(stdout.into_owned());
        }
        let subcommand = args.first().copied().unwrap_or("git");
        Err(EngineError::Git(redact(&format!(
            "{subcommand}: {}",
            combine(&stderr, &stdout)
        ))))
    }
}

/// `http.extraHeader=Authorization: Basic base64("x-access-token:<pat>")`
fn auth_header(token: &AccessToken) -> String {
    let basic = STANDARD.encode(format!("x-access-token:{}", token.expose_secret()));
    format!("http.extraHeader=Authorization: Basic {basic}")
}

fn combine(stderr: &str, stdout: &str) -> String {
    let stderr = stderr.trim();
    let stdout = stdout.trim();
    match (stderr.is_empty(), stdout.is_empty()) {
        (false, false) => format!("{stderr}\n{stdout}"),
        (false, true) => stderr.to_owned(),
        _ => stdout.to_owned(),
    }
}
