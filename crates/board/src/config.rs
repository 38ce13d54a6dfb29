//! Environment-backed configuration.
//!
//! Binaries load `.env` with `dotenvy` first; everything here reads through a
//! lookup function so tests can supply their own environment.

use std::path::PathBuf;

use thiserror::Error;

/// Page size used for the top page when none is configured.
pub const DEFAULT_TOPPAGE_QUESTION_COUNT: usize = 10;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: usize = 8;

/// Runtime configuration for the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Postgres connection string (`DATABASE_URL`).
    pub database_url: String,

    /// Maximum pooled connections (`BOARD_POOL_SIZE`).
    pub pool_size: usize,

    /// `page.toppage.questions.count` (`BOARD_TOPPAGE_QUESTIONS_COUNT`).
    ///
    /// `None` when unset or explicitly `null`.
    pub toppage_questions_count: Option<usize>,

    /// Where the safety check prepares database backups (`BOARD_BACKUP_DIR`).
    pub backup_dir: PathBuf,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let pool_size = match lookup("BOARD_POOL_SIZE") {
            None => DEFAULT_POOL_SIZE,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "BOARD_POOL_SIZE",
                        value: raw,
                        reason: "expected a positive integer",
                    });
                }
            },
        };

        let toppage_questions_count = match lookup("BOARD_TOPPAGE_QUESTIONS_COUNT") {
            None => None,
            Some(raw) => parse_optional_count(&raw).ok_or(ConfigError::Invalid {
                key: "BOARD_TOPPAGE_QUESTIONS_COUNT",
                value: raw.clone(),
                reason: "expected a non-negative integer or null",
            })?,
        };

        let backup_dir = lookup("BOARD_BACKUP_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("storage/backups"));

        Ok(Self {
            database_url,
            pool_size,
            toppage_questions_count,
            backup_dir,
        })
    }
}

/// `null`, `(null)` and the empty string all mean "not configured".
fn parse_optional_count(raw: &str) -> Option<Option<usize>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "(null)" {
        return Some(None);
    }
    trimmed.parse::<usize>().ok().map(Some)
}

/// Interpret an environment value as a boolean flag.
///
/// Follows the usual `.env` conventions: `true`/`(true)`/`1`/`on`/`yes` are
/// true, `false`/`(false)`/`0`/`off`/`no`/`null`/empty are false, and any
/// other non-empty string counts as set.
pub fn parse_bool(raw: &str) -> bool {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "(true)" | "1" | "on" | "yes" => true,
        "false" | "(false)" | "0" | "off" | "no" | "null" | "(null)" | "empty" | "(empty)"
        | "" => false,
        _ => true,
    }
}
