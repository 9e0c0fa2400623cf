//! Runtime configuration for storage and logging.
//!
//! # Responsibility
//! - Describe where the relational store lives and how connections behave.
//! - Read overrides from `MARKETPLACE_*` environment variables.
//!
//! # Invariants
//! - Parsing never panics; malformed values surface as `ConfigError`.
//! - `from_lookup` is the single parsing path; `from_env` only supplies the
//!   process environment to it.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

pub const ENV_DB_PATH: &str = "MARKETPLACE_DB_PATH";
pub const ENV_DB_BUSY_TIMEOUT_MS: &str = "MARKETPLACE_DB_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "MARKETPLACE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "MARKETPLACE_LOG_DIR";

/// Database file used when no path is configured, relative to the cwd.
pub const DEFAULT_DB_FILE_NAME: &str = "database.db";
/// Path value selecting a process-local in-memory store.
pub const MEMORY_DB_PATH: &str = ":memory:";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but cannot be parsed.
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for {key}")
            }
        }
    }
}

impl Error for ConfigError {}

/// Where the relational store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file, created on first open.
    File(PathBuf),
    /// Process-local store that lives as long as its `ConnectionManager`.
    Memory,
}

/// Storage configuration consumed by `ConnectionManager::open`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    /// How long a session waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: StoreLocation::File(path.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::Memory,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Reads `MARKETPLACE_DB_PATH` and `MARKETPLACE_DB_BUSY_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match non_blank(lookup(ENV_DB_PATH)) {
            Some(path) if path == MEMORY_DB_PATH => Self::in_memory(),
            Some(path) => Self::file(path),
            None => Self::file(DEFAULT_DB_FILE_NAME),
        };

        if let Some(raw) = non_blank(lookup(ENV_DB_BUSY_TIMEOUT_MS)) {
            let millis = raw
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: ENV_DB_BUSY_TIMEOUT_MS,
                    value: raw.clone(),
                })?;
            config.busy_timeout = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::file(DEFAULT_DB_FILE_NAME)
    }
}

/// Logging configuration consumed by `init_logging`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Absolute directory for rolling log files. `None` leaves logging off.
    pub dir: Option<PathBuf>,
}

impl LogConfig {
    /// Reads `MARKETPLACE_LOG_LEVEL` and `MARKETPLACE_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            level: non_blank(lookup(ENV_LOG_LEVEL))
                .unwrap_or_else(|| default_log_level().to_string()),
            dir: non_blank(lookup(ENV_LOG_DIR)).map(PathBuf::from),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
