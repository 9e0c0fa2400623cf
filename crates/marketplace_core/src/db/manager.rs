//! Connection manager for one relational store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite stores and bootstrap their schema.
//! - Hand out independent sessions, one connection each.
//! - Release the store at teardown.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - No session is handed out before migrations succeed.
//! - In-memory stores are private to one manager and live until `close`
//!   or drop.

use super::migrations::apply_migrations;
use super::session::Session;
use super::DbResult;
use crate::config::{StoreConfig, StoreLocation};
use log::{error, info, warn};
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use uuid::Uuid;

enum StoreTarget {
    File(PathBuf),
    /// Named `memdb` database shared by every connection of this process
    /// that opens the same URI.
    Memory { uri: String },
}

impl StoreTarget {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory { .. } => "memory",
        }
    }
}

/// Owns the store location and lends out sessions.
///
/// Pass one manager by reference to every repository; there is no global
/// connection state.
pub struct ConnectionManager {
    target: StoreTarget,
    busy_timeout: Duration,
    /// Keeps an in-memory store alive between sessions.
    anchor: Mutex<Option<Connection>>,
    open_sessions: Arc<AtomicUsize>,
    next_session_id: AtomicU64,
}

impl ConnectionManager {
    /// Opens the configured store and applies all pending migrations.
    ///
    /// # Side effects
    /// - Creates the database file when it does not exist.
    /// - Emits `db_open` logging events with duration and status.
    pub fn open(config: &StoreConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        let target = match &config.location {
            StoreLocation::File(path) => StoreTarget::File(path.clone()),
            StoreLocation::Memory => StoreTarget::Memory {
                uri: format!("file:/marketplace-{}?vfs=memdb", Uuid::new_v4().simple()),
            },
        };
        let mode = target.mode();
        info!("event=db_open module=db status=start mode={mode}");

        let manager = Self {
            target,
            busy_timeout: config.busy_timeout,
            anchor: Mutex::new(None),
            open_sessions: Arc::new(AtomicUsize::new(0)),
            next_session_id: AtomicU64::new(1),
        };

        match manager.bootstrap() {
            Ok(applied) => {
                info!(
                    "event=db_open module=db status=ok mode={mode} migrations_applied={applied} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(manager)
            }
            Err(err) => {
                error!(
                    "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Opens a fresh private in-memory store.
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(&StoreConfig::in_memory())
    }

    /// Applies pending migrations. Safe to call any number of times.
    ///
    /// Returns the number of migrations applied by this call.
    pub fn ensure_schema(&self) -> DbResult<usize> {
        let mut conn = self.connect()?;
        apply_migrations(&mut conn)
    }

    /// Lends a session scoped to one logical operation.
    ///
    /// The session owns its own connection, so concurrent callers never share
    /// a transaction. Dropping the session releases the connection.
    pub fn session(&self) -> DbResult<Session> {
        let conn = self.connect().map_err(|err| {
            error!(
                "event=session_open module=db status=error mode={} error_code=db_connect_failed error={err}",
                self.target.mode()
            );
            err
        })?;
        let id = self.next_session_id.fetch_add(1, Ordering::Relaxed);
        Ok(Session::new(conn, id, Arc::clone(&self.open_sessions)))
    }

    /// Number of sessions currently lent out.
    pub fn open_sessions(&self) -> usize {
        self.open_sessions.load(Ordering::SeqCst)
    }

    /// Releases the store.
    ///
    /// For in-memory stores this discards all data once outstanding sessions
    /// are gone.
    pub fn close(self) -> DbResult<()> {
        let outstanding = self.open_sessions();
        if outstanding > 0 {
            warn!("event=db_close module=db status=warn outstanding_sessions={outstanding}");
        }

        let anchor = self
            .anchor
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(conn) = anchor {
            conn.close().map_err(|(_, err)| err)?;
        }

        info!("event=db_close module=db status=ok mode={}", self.target.mode());
        Ok(())
    }

    fn bootstrap(&self) -> DbResult<usize> {
        let mut conn = self.connect()?;
        let applied = apply_migrations(&mut conn)?;

        if let StoreTarget::Memory { .. } = self.target {
            *self.anchor.lock().unwrap_or_else(PoisonError::into_inner) = Some(conn);
        }

        Ok(applied)
    }

    fn connect(&self) -> DbResult<Connection> {
        let conn = match &self.target {
            StoreTarget::File(path) => Connection::open(path)?,
            StoreTarget::Memory { uri } => {
                let conn = Connection::open_with_flags(
                    uri,
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_CREATE
                        | OpenFlags::SQLITE_OPEN_URI
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )?;
                // memdb only stores the main database; keep the rollback
                // journal in memory too.
                conn.execute_batch("PRAGMA journal_mode = MEMORY;")?;
                conn
            }
        };

        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(self.busy_timeout)?;
        Ok(conn)
    }
}
