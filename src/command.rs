//! Write-intent statements.

use std::ops::{Deref, DerefMut};

use crate::connection::Connection;
use crate::error::{DbError, DbResult};
use crate::ffi;
use crate::statement::{StatementCore, StepResult};
use crate::value::Value;

/// A prepared statement executed for effect (DML, DDL, PRAGMA): no result
/// rows are expected.
///
/// Created via [`Connection::command`]. Derefs to [`StatementCore`] for
/// binding and the raw result-code primitives. Finalized when dropped.
#[derive(Debug)]
pub struct Command<'conn> {
    conn: &'conn Connection,
    core: StatementCore,
    /// Uncompiled remainder of the input text, consumed by
    /// [`execute_all`](Self::execute_all).
    tail: String,
}

impl<'conn> Command<'conn> {
    pub(crate) fn new(conn: &'conn Connection, sql: &str) -> DbResult<Self> {
        let mut core = StatementCore::new(conn.raw_db());
        let tail = core.prepare(sql)?;
        Ok(Self { conn, core, tail })
    }

    /// Finalizes the current handle and compiles `sql` in its place.
    pub fn prepare(&mut self, sql: &str) -> DbResult<()> {
        self.tail = self.core.prepare(sql)?;
        Ok(())
    }

    /// Fluent positional binder starting at 1-based `start_index`.
    pub fn binder(&mut self, start_index: usize) -> Binder<'_> {
        Binder {
            core: &mut self.core,
            idx: start_index,
        }
    }

    /// Drives the statement to completion and returns the number of rows
    /// changed.
    ///
    /// A result row is treated as misuse: use [`Query`](crate::Query) for
    /// row-returning SQL. Call [`reset_code`](StatementCore::reset_code)
    /// before re-executing.
    pub fn execute(&mut self) -> DbResult<usize> {
        match self.core.step()? {
            StepResult::Done => Ok(self.conn.changes()),
            StepResult::Row => Err(DbError::step(
                ffi::SQLITE_MISUSE,
                "statement returned a result row; use Query for row-returning SQL",
            )),
        }
    }

    /// Executes every statement of the semicolon-separated batch this
    /// command was prepared from, returning the total number of rows
    /// changed.
    ///
    /// Stops at the first failing statement; the remainder of the batch is
    /// not executed. Parameters bound so far apply only to the first
    /// statement.
    pub fn execute_all(&mut self) -> DbResult<usize> {
        let mut total = if self.core.is_prepared() {
            self.execute()?
        } else {
            0
        };
        while !self.tail.trim().is_empty() {
            let sql = std::mem::take(&mut self.tail);
            self.prepare(&sql)?;
            if self.core.is_prepared() {
                total += self.execute()?;
            }
        }
        Ok(total)
    }
}

impl Deref for Command<'_> {
    type Target = StatementCore;

    fn deref(&self) -> &StatementCore {
        &self.core
    }
}

impl DerefMut for Command<'_> {
    fn deref_mut(&mut self) -> &mut StatementCore {
        &mut self.core
    }
}

/// Chained positional binder; raises on the first failing bind instead of
/// continuing.
///
/// ```no_run
/// # fn demo(conn: &litebind::Connection) -> litebind::DbResult<()> {
/// let mut cmd = conn.command("INSERT INTO t (id, val) VALUES (?1, ?2)")?;
/// cmd.binder(1).bind(5_i64)?.bind("five")?;
/// cmd.execute()?;
/// # Ok(())
/// # }
/// ```
pub struct Binder<'a> {
    core: &'a mut StatementCore,
    idx: usize,
}

impl<'a> Binder<'a> {
    /// Binds `value` at the current index and advances to the next one.
    pub fn bind(self, value: impl Into<Value>) -> DbResult<Self> {
        let Self { core, idx } = self;
        core.bind(idx, value)?;
        Ok(Self { core, idx: idx + 1 })
    }
}

impl std::fmt::Debug for Binder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Binder").field("idx", &self.idx).finish()
    }
}
