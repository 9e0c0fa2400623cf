//! Repository layer contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define entity-oriented data access contracts.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Create paths validate every field before a session is opened.
//! - Every operation opens exactly one session and releases it before
//!   returning.
//! - Repository APIs return semantic errors (`NotFound`) separately from
//!   storage errors.

pub mod product_repo;
pub mod user_repo;

use crate::db::DbError;
use crate::model::patch::PatchOutcome;
use crate::validate::ValidationError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity family named in `RepoError::NotFound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Product,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Product => f.write_str("product"),
        }
    }
}

/// Error for entity persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// A mandatory field failed validation; nothing was written.
    Validation(ValidationError),
    /// No row matches the lookup key.
    NotFound { entity: EntityKind, key: String },
    /// The store rejected the operation; any transaction was rolled back.
    Storage(DbError),
    /// A persisted row cannot be converted into a valid entity.
    InvalidData(String),
}

impl RepoError {
    pub(crate) fn not_found(entity: EntityKind, key: impl Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::Storage(err) if err.is_constraint_violation() => "constraint_violation",
            Self::Storage(_) => "storage_failed",
            Self::InvalidData(_) => "invalid_data",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound { entity, key } => write!(f, "{entity} not found: {key}"),
            Self::Storage(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::NotFound { .. } => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Storage(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(DbError::Sqlite(value))
    }
}

fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Emits one metadata-only log line for a finished repository operation.
fn log_operation<T>(event: &str, id: Uuid, result: &RepoResult<T>, started_at: Instant) {
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => info!("event={event} module=repo status=ok id={id} duration_ms={duration_ms}"),
        Err(err) => warn!(
            "event={event} module=repo status=error id={id} duration_ms={duration_ms} error_code={}",
            err.code()
        ),
    }
}

fn log_patch(event: &str, id: Uuid, outcome: &PatchOutcome) {
    if !outcome.skipped.is_empty() {
        info!(
            "event={event} module=repo status=partial id={id} applied_fields={} skipped_fields={}",
            outcome.applied.join(","),
            outcome.skipped.join(",")
        );
    }
}
