// src/redact.rs
//! Best-effort scrubbing of credentials and home paths from diagnostic text
//!
//! Every line headed for a persistent log goes through [`redact`] first.
//! This is pattern matching, not a security boundary: a token that does not
//! look like any of the known shapes will pass through untouched.

use once_cell::sync::Lazy;
use regex::Regex;

static PATTERNS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)(http\.extraHeader=Authorization:\s*Basic\s+)[A-Za-z0-9+/=]+")
                .expect("valid pattern"),
            "$1[REDACTED]",
        ),
        (
            Regex::new(r"(?i)(Authorization:\s*(?:Basic|Bearer)\s+)[A-Za-z0-9+/=._-]+")
                .expect("valid pattern"),
            "$1[REDACTED]",
        ),
        (
            Regex::new(r#"(?i)(x-access-token:)[^\s'"]+"#).expect("valid pattern"),
            "$1[REDACTED]",
        ),
        (
            Regex::new(r"(?i)(https?://)([^/\s:@]+):([^@\s]+)@").expect("valid pattern"),
            "$1[REDACTED]:[REDACTED]@",
        ),
        (
            Regex::new(r"(?i)(ghp_|github_pat_)[A-Za-z0-9_]+").expect("valid pattern"),
            "$1[REDACTED]",
        ),
        (
            Regex::new(r"([A-Za-z]:\\Users\\)([^\\\r\n]+)").expect("valid pattern"),
            "$1***",
        ),
        (
            Regex::new(r"(/Users/)([^/\r\n]+)").expect("valid pattern"),
            "$1***",
        ),
        (
            Regex::new(r"(/home/)([^/\r\n]+)").expect("valid pattern"),
            "$1***",
        ),
    ]
});

/// Scrub auth headers, URL credentials, token prefixes and home-directory
/// usernames from `text`.
pub fn redact(text: &str) -> String {
    PATTERNS.iter().fold(text.to_owned(), |acc, (re, rep)| {
        re.replace_all(&acc, *rep).into_owned()
    })
}

/// Collapse a filesystem path to `.../<last-segment>` for display.
pub fn mask_path_for_display(value: &str) -> String {
    let trimmed = value.trim().trim_end_matches(['/', '\\']);
    match trimmed.rsplit(['/', '\\']).find(|part| !part.is_empty()) {
        Some(last) => format!(".../{last}"),
        None => String::new(),
    }
}
