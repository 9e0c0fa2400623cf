//! Operation-scoped database session.
//!
//! # Invariants
//! - A session is never shared: it is neither `Clone` nor `Sync`.
//! - `write` commits on `Ok` and rolls back on `Err`; a failed commit also
//!   rolls back.
//! - The connection is released on drop, on every exit path.

use log::{debug, error};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Transactional handle to the store for one logical operation.
pub struct Session {
    conn: Connection,
    id: u64,
    opened_at: Instant,
    open_sessions: Arc<AtomicUsize>,
}

impl Session {
    pub(super) fn new(conn: Connection, id: u64, open_sessions: Arc<AtomicUsize>) -> Self {
        open_sessions.fetch_add(1, Ordering::SeqCst);
        debug!("event=session_open module=db status=ok session_id={id}");
        Self {
            conn,
            id,
            opened_at: Instant::now(),
            open_sessions,
        }
    }

    /// Session identifier, unique per `ConnectionManager`.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Runs a read-only operation outside an explicit transaction.
    pub fn read<T, E>(&self, op: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E> {
        op(&self.conn)
    }

    /// Runs `op` inside an immediate transaction.
    ///
    /// # Errors
    /// - Returns `op`'s error after rolling back.
    /// - Returns a storage error when the transaction cannot begin or commit.
    pub fn write<T, E>(&mut self, op: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let id = self.id;
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        match op(&tx) {
            Ok(value) => {
                // A failed commit drops `tx`, which rolls back.
                tx.commit().map_err(|err| {
                    error!(
                        "event=session_commit module=db status=error session_id={id} error={err}"
                    );
                    E::from(err)
                })?;
                debug!("event=session_commit module=db status=ok session_id={id}");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=session_rollback module=db status=error session_id={id} error={rollback_err}"
                    );
                } else {
                    debug!("event=session_rollback module=db status=ok session_id={id}");
                }
                Err(err)
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.open_sessions.fetch_sub(1, Ordering::SeqCst);
        debug!(
            "event=session_release module=db status=ok session_id={} duration_ms={}",
            self.id,
            self.opened_at.elapsed().as_millis()
        );
    }
}
