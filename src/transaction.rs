//! Scoped transactions.

use crate::command::Command;
use crate::connection::Connection;
use crate::error::DbResult;
use crate::query::Query;
use crate::row::Row;
use crate::value::Value;

/// Locking behaviour of BEGIN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionBehavior {
    /// `BEGIN DEFERRED` (the default).
    Deferred,
    /// `BEGIN IMMEDIATE` – acquires a RESERVED lock right away.
    Immediate,
}

/// What an open transaction does when its guard is dropped without an
/// explicit commit or rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropBehavior {
    /// Roll back (the default).
    #[default]
    Rollback,
    /// Commit; downgraded to a rollback while the thread is unwinding from
    /// a panic.
    Commit,
}

/// An open database transaction.
///
/// Exactly one terminating statement runs per guard: an explicit
/// [`commit`](Self::commit) or [`rollback`](Self::rollback), or the
/// drop-time completion chosen by [`DropBehavior`]. Completing an already
/// completed guard is a no-op, not an error.
pub struct Transaction<'conn> {
    conn: &'conn Connection,
    drop_behavior: DropBehavior,
    done: bool,
}

impl<'conn> Transaction<'conn> {
    /// Begins a new transaction on `conn`.
    pub(crate) fn begin(
        conn: &'conn Connection,
        behavior: TransactionBehavior,
    ) -> DbResult<Self> {
        let sql = match behavior {
            TransactionBehavior::Deferred => "BEGIN DEFERRED",
            TransactionBehavior::Immediate => "BEGIN IMMEDIATE",
        };
        conn.execute_batch(sql)?;
        Ok(Self {
            conn,
            drop_behavior: DropBehavior::Rollback,
            done: false,
        })
    }

    /// Chooses what happens if the guard is dropped while the transaction
    /// is still open.
    pub fn set_drop_behavior(&mut self, behavior: DropBehavior) {
        self.drop_behavior = behavior;
    }

    /// Commits the transaction. A no-op returning `Ok` if the transaction
    /// has already completed.
    pub fn commit(&mut self) -> DbResult<()> {
        if self.done {
            return Ok(());
        }
        self.conn.execute_batch("COMMIT")?;
        self.done = true;
        Ok(())
    }

    /// Rolls the transaction back. A no-op returning `Ok` if the
    /// transaction has already completed.
    pub fn rollback(&mut self) -> DbResult<()> {
        if self.done {
            return Ok(());
        }
        self.conn.execute_batch("ROLLBACK")?;
        self.done = true;
        Ok(())
    }

    // ── Delegated Connection methods ────────────────────────────────────

    /// See [`Connection::execute_batch`].
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        self.conn.execute_batch(sql)
    }

    /// See [`Connection::execute`].
    pub fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        self.conn.execute(sql, params)
    }

    /// See [`Connection::query_row`].
    pub fn query_row<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Row<'_>) -> DbResult<T>,
    ) -> DbResult<T> {
        self.conn.query_row(sql, params, mapper)
    }

    /// See [`Connection::query_row_optional`].
    pub fn query_row_optional<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Row<'_>) -> DbResult<T>,
    ) -> DbResult<Option<T>> {
        self.conn.query_row_optional(sql, params, mapper)
    }

    /// See [`Connection::command`].
    pub fn command(&self, sql: &str) -> DbResult<Command<'_>> {
        self.conn.command(sql)
    }

    /// See [`Connection::query`].
    pub fn query(&self, sql: &str) -> DbResult<Query<'_>> {
        self.conn.query(sql)
    }

    /// See [`Connection::last_insert_rowid`].
    #[must_use]
    pub fn last_insert_rowid(&self) -> i64 {
        self.conn.last_insert_rowid()
    }

    /// See [`Connection::changes`].
    #[must_use]
    pub fn changes(&self) -> usize {
        self.conn.changes()
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let commit =
            self.drop_behavior == DropBehavior::Commit && !std::thread::panicking();
        let sql = if commit { "COMMIT" } else { "ROLLBACK" };
        if let Err(e) = self.conn.execute_batch(sql) {
            log::warn!("{sql} failed while dropping transaction: {e}");
        }
        self.done = true;
    }
}

impl std::fmt::Debug for Transaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transaction")
            .field("drop_behavior", &self.drop_behavior)
            .field("done", &self.done)
            .finish()
    }
}
