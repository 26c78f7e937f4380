// src/logging.rs
//! Redacted persistent logging
//!
//! Anything that reaches the log file passes through the redactor first;
//! reading the tail back redacts again in case older lines predate a pattern.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::consts::MAX_LOG_LINES;
use crate::error::EngineError;
use crate::redact::redact;

/// An `io::Write` that scrubs sensitive text from every chunk it forwards.
pub struct RedactingWriter<W: Write> {
    inner: W,
}

impl<W: Write> RedactingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(redact(&text).as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Install a file sink for tracing events, wrapped in the redactor.
/// Idempotent — safe to call more than once.
#[cfg(feature = "logging")]
pub fn init_file_logging(path: &Path) -> Result<(), EngineError> {
    use std::sync::Mutex;
    use tracing_subscriber::EnvFilter;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(false)
        .with_writer(Mutex::new(RedactingWriter::new(file)))
        .try_init()
        .ok();
    Ok(())
}

/// Last `MAX_LOG_LINES` lines of the log, redacted. Missing file reads as
/// empty.
pub fn read_log_tail(path: &Path) -> Result<String, EngineError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(err) => return Err(err.into()),
    };
    let lines: Vec<&str> = content.lines().collect();
    let start = lines.len().saturating_sub(MAX_LOG_LINES);
    Ok(redact(&lines[start..].join("\n")))
}
